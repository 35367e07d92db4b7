use std::fmt;
use crate::{
  SymbolId, SymbolKind, SymbolTable, Rule, RuleId, Map, Set,
  GrammarError, InvalidGrammarError, UndefinedSymbolError,
};

mod dsl;
mod sugar;
mod sub_grammar;

pub use self::dsl::{ComponentsSpecifier, RuleSpecifier};

/// A set of rules over an interned symbol table, plus terminal precedence
/// levels and the symbol the parser accepts.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
  name: Option<String>,
  symbols: SymbolTable,
  rules: Vec<Rule>,
  precedence_levels: Map<SymbolId, u32>,
  target_symbol: Option<SymbolId>,
}

impl Grammar {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn named(name: impl Into<String>) -> Self {
    Grammar {
      name: Some(name.into()),
      ..Self::default()
    }
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = Some(name.into());
  }

  pub fn symbols(&self) -> &SymbolTable {
    &self.symbols
  }

  pub fn terminal(&mut self, name: &str) -> SymbolId {
    self.symbols.terminal(name)
  }

  pub fn nonterminal(&mut self, name: &str) -> SymbolId {
    self.symbols.nonterminal(name)
  }

  pub fn symbol_name(&self, symbol: SymbolId) -> &str {
    self.symbols.name(symbol)
  }

  /// Starts a rule by giving its target; finish it with `def`.
  pub fn target(&mut self, symbol: SymbolId) -> ComponentsSpecifier<'_> {
    ComponentsSpecifier::new(self, symbol)
  }

  /// Adds `target → clause`. An empty clause is recorded as `target → ε`.
  pub fn add_rule(
    &mut self,
    target: SymbolId,
    clause: &[SymbolId],
  ) -> Result<RuleSpecifier<'_>, GrammarError> {
    if !self.symbols.is_nonterminal(target) {
      return Err(InvalidGrammarError::new(format!(
        "the target symbol `{}` cannot be a terminal",
        self.symbols.name(target))).into());
    }

    if let Some(&unknown) = clause.iter().find(|&&sym| !self.symbols.contains(sym)) {
      return Err(InvalidGrammarError::new(format!(
        "symbol #{} is not known to this grammar",
        unknown.id())).into());
    }

    let clause = if clause.is_empty() {
      vec![SymbolId::EMPTY]
    } else {
      clause.to_vec()
    };

    let id = RuleId::from(self.rules.len());
    self.rules.push(Rule::new(id, target, clause));
    if self.target_symbol.is_none() {
      self.target_symbol = Some(target);
    }

    Ok(RuleSpecifier::new(self, id))
  }

  pub fn add_empty_rule(&mut self, target: SymbolId) -> Result<RuleSpecifier<'_>, GrammarError> {
    self.add_rule(target, &[])
  }

  /// Rules in id order.
  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn rule_by_id(&self, id: RuleId) -> Option<&Rule> {
    self.rules.get(id.index())
  }

  pub(crate) fn rule_mut(&mut self, id: RuleId) -> &mut Rule {
    &mut self.rules[id.index()]
  }

  pub fn rules_targeting(&self, symbol: SymbolId) -> impl Iterator<Item = &Rule> + '_ {
    self.rules.iter().filter(move |rule| rule.target == symbol)
  }

  /// The symbol accepted by the parser: the target of the first rule added,
  /// or of the rule passed to `set_target_rule`.
  pub fn target_symbol(&self) -> Option<SymbolId> {
    self.target_symbol
      .or_else(|| self.rules.first().map(|rule| rule.target))
  }

  /// Makes `id` the accepted rule. Its symbol must be the target of no other
  /// rule. The rule becomes id 0; all other rules keep their relative order.
  pub fn set_target_rule(&mut self, id: RuleId) -> Result<(), GrammarError> {
    let target = match self.rule_by_id(id) {
      Some(rule) => rule.target,
      None => {
        return Err(InvalidGrammarError::new(format!("unknown rule #{}", id)).into());
      }
    };

    let count = self.rules_targeting(target).count();
    if count != 1 {
      return Err(InvalidGrammarError::new(format!(
        "the rule `{}` cannot be used as target rule: {} rules target `{}`",
        self.rules[id.index()].display(&self.symbols),
        count,
        self.symbols.name(target))).into());
    }

    self.target_symbol = Some(target);

    if id != RuleId::TARGET {
      let rule = self.rules.remove(id.index());
      self.rules.insert(0, rule);
      for (ix, rule) in self.rules.iter_mut().enumerate() {
        rule.id = RuleId::from(ix);
      }
    }

    Ok(())
  }

  /// Declares the precedence level of terminals. Higher binds tighter.
  pub fn set_precedence_level(&mut self, level: u32, symbols: &[SymbolId]) {
    for &symbol in symbols {
      self.precedence_levels.insert(symbol, level);
    }
  }

  /// Declared level of a terminal, 0 when none was declared.
  pub fn precedence_level(&self, symbol: SymbolId) -> u32 {
    self.precedence_levels.get(&symbol).copied().unwrap_or(0)
  }

  pub(crate) fn precedence_levels(&self) -> &Map<SymbolId, u32> {
    &self.precedence_levels
  }

  /// Terminals appearing in clauses, excluding `ε`, in id order.
  pub fn terminals(&self) -> Vec<SymbolId> {
    self.collect_symbols(|grammar, sym| {
      sym != SymbolId::EMPTY && grammar.symbols.is_terminal(sym)
    })
  }

  /// Targets of rules, in id order.
  pub fn nonterminals(&self) -> Vec<SymbolId> {
    let mut nts = self.rules.iter()
      .map(|rule| rule.target)
      .collect::<Set<_>>()
      .into_iter()
      .collect::<Vec<_>>();
    nts.sort();
    nts
  }

  /// Every rule target plus every terminal appearing in a clause.
  pub fn used_symbols(&self) -> Vec<SymbolId> {
    let mut symbols = self.terminals();
    symbols.extend(self.nonterminals());
    symbols.sort();
    symbols
  }

  fn collect_symbols(&self, pred: impl Fn(&Self, SymbolId) -> bool) -> Vec<SymbolId> {
    let mut set = Set::default();
    for rule in &self.rules {
      for &sym in &rule.clause {
        if pred(self, sym) {
          set.insert(sym);
        }
      }
    }
    let mut symbols = set.into_iter().collect::<Vec<_>>();
    symbols.sort();
    symbols
  }

  /// Checks that every non-terminal reachable from the target symbol is
  /// defined by at least one rule.
  pub fn check_defined(&self) -> Result<(), GrammarError> {
    let target = self.target_symbol()
      .ok_or_else(|| InvalidGrammarError::new("the grammar has no rules"))?;

    let mut seen = Set::default();
    let mut stack: Vec<(SymbolId, Option<RuleId>)> = vec![(target, None)];
    seen.insert(target);

    while let Some((symbol, referenced_by)) = stack.pop() {
      let mut defined = false;
      for rule in self.rules_targeting(symbol) {
        defined = true;
        for &sym in rule.symbols() {
          if self.symbols.kind(sym) == Some(SymbolKind::Nonterminal) && seen.insert(sym) {
            stack.push((sym, Some(rule.id)));
          }
        }
      }

      if !defined {
        return Err(UndefinedSymbolError {
          symbol: self.symbols.name(symbol).to_owned(),
          referenced_by: referenced_by.map(|id| {
            self.rules[id.index()].display(&self.symbols).to_string()
          }),
        }.into());
      }
    }

    Ok(())
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if let Some(name) = &self.name {
      write!(f, "{} : ", name)?;
    }
    writeln!(f, "{{")?;
    for rule in &self.rules {
      writeln!(f, "    ({}) {}", rule.id, rule.display(&self.symbols))?;
    }
    writeln!(f, "}}")
  }
}
