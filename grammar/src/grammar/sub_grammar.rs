use std::borrow::Cow;
use log::debug;
use crate::{
  Grammar, GrammarError, SymbolId, SymbolKind, RuleId, Rule, Set, Map,
  UndefinedSymbolError,
};

impl Grammar {
  /// Assigns each rule the level of the last terminal of its clause that
  /// has a declared precedence, and hands that level one hop further to
  /// every rule whose clause mentions the rule's target.
  ///
  /// A rule's own level wins over a propagated one; among propagated levels
  /// the one from the highest rule id wins. Explicit levels set with
  /// `with_precedence_level` are never overridden. Propagation is not
  /// transitive.
  pub fn fix_precedence_levels(&mut self) {
    let n = self.rules.len();
    let mut own = vec![None; n];
    let mut propagated = vec![None; n];

    for (ix, rule) in self.rules.iter().enumerate() {
      let level = rule.clause.iter().rev().find_map(|&sym| {
        if self.symbols.is_terminal(sym) {
          self.precedence_levels.get(&sym).copied()
        } else {
          None
        }
      });

      if let Some(level) = level {
        own[ix] = Some(level);
        for (jx, other) in self.rules.iter().enumerate() {
          if other.clause.contains(&rule.target) {
            propagated[jx] = Some(level);
          }
        }
      }
    }

    for (ix, rule) in self.rules.iter_mut().enumerate() {
      rule.inherited_precedence = own[ix].or(propagated[ix]);
      if let Some(level) = rule.inherited_precedence {
        debug!("precedence level {} : {}", level, rule.display(&self.symbols));
      }
    }
  }

  /// A grammar whose accepted rule derives `symbol`.
  ///
  /// When `symbol` is the target of exactly one rule, that rule becomes the
  /// target rule of this grammar, which is returned as is. Otherwise a new
  /// grammar holds a fresh rule `start → symbol` plus exactly the rules
  /// reachable from `symbol`.
  pub fn sub_grammar(&mut self, symbol: SymbolId) -> Result<Cow<'_, Grammar>, GrammarError> {
    self.fix_precedence_levels();

    let target_rules = self.rules_targeting(symbol)
      .map(|rule| rule.id)
      .collect::<Vec<_>>();

    match target_rules.as_slice() {
      [] => Err(UndefinedSymbolError {
        symbol: self.symbols.name(symbol).to_owned(),
        referenced_by: None,
      }.into()),
      &[rule] => {
        self.set_target_rule(rule)?;
        Ok(Cow::Borrowed(&*self))
      }
      _ => Ok(Cow::Owned(self.extract(symbol))),
    }
  }

  fn extract(&self, symbol: SymbolId) -> Grammar {
    let reachable = self.reachable_rules(symbol);
    let symbol_name = self.symbols.name(symbol);

    let mut sub = Grammar {
      name: self.name.as_ref().map(|name| {
        format!("Subgrammar of '{}' targeting '{}'", name, symbol_name)
      }),
      symbols: self.symbols.clone(),
      rules: Vec::with_capacity(reachable.len() + 1),
      precedence_levels: self.precedence_levels.clone(),
      target_symbol: None,
    };

    let start = sub.symbols.fresh_nonterminal(&format!("<{}>", symbol_name));
    let mut start_rule = Rule::new(RuleId::TARGET, start, vec![symbol]);
    start_rule.name = Some("start".to_owned());
    sub.rules.push(start_rule);

    for id in reachable {
      let mut rule = self.rules[id.index()].clone();
      rule.id = RuleId::from(sub.rules.len());
      sub.rules.push(rule);
    }

    sub.target_symbol = Some(start);
    sub
  }

  /// Rules reachable from `symbol` through rule targets, in id order.
  fn reachable_rules(&self, symbol: SymbolId) -> Vec<RuleId> {
    let mut by_target = Map::<SymbolId, Vec<RuleId>>::default();
    for rule in &self.rules {
      by_target.entry(rule.target).or_default().push(rule.id);
    }

    let mut seen = Set::default();
    let mut included = Vec::new();
    let mut stack = vec![symbol];
    seen.insert(symbol);

    while let Some(nt) = stack.pop() {
      for &id in by_target.get(&nt).map(Vec::as_slice).unwrap_or(&[]) {
        included.push(id);
        for &sym in &self.rules[id.index()].clause {
          if self.symbols.kind(sym) == Some(SymbolKind::Nonterminal) && seen.insert(sym) {
            stack.push(sym);
          }
        }
      }
    }

    included.sort();
    included
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Associativity, RuleId};
  use pretty_assertions::assert_eq;

  fn clauses(g: &Grammar) -> Vec<String> {
    g.rules().iter().map(|r| r.display(g.symbols()).to_string()).collect()
  }

  #[test]
  fn unique_target_reuses_grammar() {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let a = g.nonterminal("A");
    let x = g.terminal("x");
    g.target(a).def(&[x]).unwrap();
    g.target(s).def(&[a, a]).unwrap();

    let sub = g.sub_grammar(s).unwrap();
    assert!(matches!(sub, Cow::Borrowed(_)));
    assert_eq!(clauses(&sub), vec!["S → A A", "A → x"]);
    assert_eq!(sub.rule_by_id(RuleId::TARGET).unwrap().target(), s);
  }

  #[test]
  fn non_unique_target_extracts_reachable_rules() {
    let mut g = Grammar::named("lang");
    let stmt = g.nonterminal("Stmt");
    let expr = g.nonterminal("Expr");
    let atom = g.nonterminal("Atom");
    let unrelated = g.nonterminal("Unrelated");
    let x = g.terminal("x");
    let plus = g.terminal("+");
    let semi = g.terminal(";");

    g.target(stmt).def(&[expr, semi]).unwrap();
    g.target(unrelated).def(&[semi, semi]).unwrap();
    g.target(expr).def(&[expr, plus, atom]).unwrap();
    g.target(expr).def(&[atom]).unwrap();
    g.target(atom).def(&[x]).unwrap();

    let sub = g.sub_grammar(expr).unwrap().into_owned();
    assert_eq!(sub.name(), Some("Subgrammar of 'lang' targeting 'Expr'"));
    assert_eq!(clauses(&sub), vec![
      "<Expr> → Expr",
      "Expr → Expr + Atom",
      "Expr → Atom",
      "Atom → x",
    ]);
    assert_eq!(sub.symbol_name(sub.target_symbol().unwrap()), "<Expr>");
    assert_eq!(sub.check_defined(), Ok(()));

    // the original grammar is left untouched
    assert_eq!(g.rules().len(), 5);
  }

  #[test]
  fn unknown_target() {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let t = g.nonterminal("T");
    let x = g.terminal("x");
    g.target(s).def(&[x]).unwrap();
    assert!(matches!(g.sub_grammar(t), Err(GrammarError::UndefinedSymbol(_))));
  }

  #[test]
  fn precedence_comes_from_last_terminal() {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    let plus = g.terminal("+");
    let mult = g.terminal("*");
    let num = g.terminal("num");
    g.set_precedence_level(1, &[plus]);
    g.set_precedence_level(2, &[mult]);
    g.target(e).def(&[e, plus, e]).unwrap();
    g.target(e).def(&[e, mult, e]).unwrap();
    g.target(e).def(&[num]).unwrap();
    g.fix_precedence_levels();

    let levels = g.rules().iter().map(Rule::precedence_level).collect::<Vec<_>>();
    // `E → num` mentions no precedence terminal and does not reference `E`
    assert_eq!(levels, vec![1, 2, 0]);
  }

  #[test]
  fn precedence_propagates_one_hop() {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let a = g.nonterminal("A");
    let b = g.nonterminal("B");
    let x = g.terminal("x");
    let y = g.terminal("y");
    g.set_precedence_level(4, &[x]);
    g.target(s).def(&[b]).unwrap();
    g.target(b).def(&[a, y]).unwrap();
    g.target(a).def(&[x]).unwrap();
    g.fix_precedence_levels();

    let levels = g.rules().iter().map(Rule::precedence_level).collect::<Vec<_>>();
    // `B → A y` inherits from `A → x`, `S → B` is two hops away
    assert_eq!(levels, vec![0, 4, 4]);
  }

  #[test]
  fn explicit_precedence_wins() {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    let minus = g.terminal("-");
    g.set_precedence_level(1, &[minus]);
    g.target(e).def(&[minus, e]).unwrap()
      .with_precedence_level(9)
      .with_associativity(Associativity::Right);
    g.fix_precedence_levels();
    assert_eq!(g.rules()[0].precedence_level(), 9);
  }
}
