use std::ops::Range;
use grammar::{Grammar, GrammarError, InvalidGrammarError, SymbolId, RuleId, Map};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
  Token(SymbolId),
  /// index into `LoweredGrammar::nts`
  Nonterminal(usize),
}

#[derive(Debug, Clone)]
pub struct Production {
  /// index into `LoweredGrammar::nts`
  pub nt: usize,
  pub symbols: Vec<Symbol>,
  /// `None` for the augmenting production.
  pub rule: Option<RuleId>,
}

/// The rules of a grammar regrouped so that the productions of every
/// non-terminal are contiguous, plus the augmenting production `^ → S`.
#[derive(Debug, Clone)]
pub struct LoweredGrammar {
  pub prods: Vec<Production>,
  /// non-terminal -> range of its productions in `prods`
  pub nts: Map<SymbolId, Range<usize>>,
  /// Width of a table row: one column per symbol of the symbol table.
  pub num_symbols: usize,
  /// The augmenting production, always 0.
  pub start_prod: usize,
  /// The accepted symbol `S`.
  pub target: SymbolId,
}

impl LoweredGrammar {
  pub fn nt_symbol(&self, nt: usize) -> SymbolId {
    self.nts.get_index(nt).map_or(SymbolId::EMPTY, |(sym, _)| *sym)
  }

  pub fn symbol_id(&self, symbol: Symbol) -> SymbolId {
    match symbol {
      Symbol::Token(token) => token,
      Symbol::Nonterminal(nt) => self.nt_symbol(nt),
    }
  }

  pub fn nt_range(&self, nt: usize) -> Range<usize> {
    self.nts.get_index(nt).map_or(0..0, |(_, range)| range.clone())
  }
}

/// Lowers `grammar` and adds `^ → S`, where `S` is the target symbol. `^`
/// is given the id just past the symbol table so it never takes a table
/// column.
pub fn augment(grammar: &Grammar) -> Result<LoweredGrammar, GrammarError> {
  let target = grammar.target_symbol()
    .ok_or_else(|| InvalidGrammarError::new("the grammar has no rules"))?;
  let symbols = grammar.symbols();
  let num_symbols = symbols.len();
  let start_nt = SymbolId::from(num_symbols);

  let mut by_nt = Map::<SymbolId, Vec<RuleId>>::default();
  by_nt.insert(start_nt, vec![]);
  for rule in grammar.rules() {
    by_nt.entry(rule.target()).or_default().push(rule.id());
  }
  for rule in grammar.rules() {
    for &sym in rule.symbols() {
      if symbols.is_nonterminal(sym) {
        by_nt.entry(sym).or_default();
      }
    }
  }

  let lower_symbol = |sym: SymbolId| match by_nt.get_index_of(&sym) {
    Some(nt) if symbols.is_nonterminal(sym) => Symbol::Nonterminal(nt),
    _ => Symbol::Token(sym),
  };

  let mut prods = Vec::with_capacity(grammar.rules().len() + 1);
  let mut nts = Map::default();

  for (nt, (&sym, rules)) in by_nt.iter().enumerate() {
    let start = prods.len();
    if sym == start_nt {
      prods.push(Production {
        nt,
        symbols: vec![lower_symbol(target)],
        rule: None,
      });
    }

    for &id in rules {
      if let Some(rule) = grammar.rule_by_id(id) {
        prods.push(Production {
          nt,
          symbols: rule.symbols().iter().map(|&s| lower_symbol(s)).collect(),
          rule: Some(id),
        });
      }
    }

    nts.insert(sym, start..prods.len());
  }

  Ok(LoweredGrammar {
    prods,
    nts,
    num_symbols,
    start_prod: 0,
    target,
  })
}
