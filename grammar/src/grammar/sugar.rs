//! Shorthands that expand into plain rules through `add_rule`.

use crate::{Grammar, GrammarError, SymbolId, AstNode, InternalNode};

impl Grammar {
  fn symbol_list(&self, symbols: &[SymbolId]) -> String {
    symbols.iter()
      .map(|&sym| self.symbol_name(sym))
      .collect::<Vec<_>>()
      .join(", ")
  }

  /// ```text
  /// oneOf(a, b) → a
  /// oneOf(a, b) → b
  /// ```
  pub fn one_of(&mut self, symbols: &[SymbolId]) -> Result<SymbolId, GrammarError> {
    let name = format!("oneOf({})", self.symbol_list(symbols));
    let nt = self.symbols.fresh_nonterminal(&name);
    for &sym in symbols {
      self.add_rule(nt, &[sym])?;
    }
    Ok(nt)
  }

  /// ```text
  /// optional(a, b) → a b
  /// optional(a, b) → ε
  /// ```
  pub fn optional(&mut self, symbols: &[SymbolId]) -> Result<SymbolId, GrammarError> {
    let name = format!("optional({})", self.symbol_list(symbols));
    let nt = self.symbols.fresh_nonterminal(&name);
    self.add_rule(nt, symbols)?;
    self.add_empty_rule(nt)?;
    Ok(nt)
  }

  /// ```text
  /// oneOrMore(a) → a
  /// oneOrMore(a) → oneOrMore(a) a
  /// ```
  pub fn one_or_more(&mut self, symbols: &[SymbolId]) -> Result<SymbolId, GrammarError> {
    let name = format!("oneOrMore({})", self.symbol_list(symbols));
    let nt = self.symbols.fresh_nonterminal(&name);
    self.add_repetition(nt, symbols)?;
    Ok(nt)
  }

  /// `oneOrMore` plus `zeroOrMore(a) → ε`.
  pub fn zero_or_more(&mut self, symbols: &[SymbolId]) -> Result<SymbolId, GrammarError> {
    let name = format!("zeroOrMore({})", self.symbol_list(symbols));
    let nt = self.symbols.fresh_nonterminal(&name);
    self.add_repetition(nt, symbols)?;
    self.add_empty_rule(nt)?;
    Ok(nt)
  }

  fn add_repetition(&mut self, nt: SymbolId, symbols: &[SymbolId]) -> Result<(), GrammarError> {
    self.add_rule(nt, symbols)?;
    let mut recursive = Vec::with_capacity(symbols.len() + 1);
    recursive.push(nt);
    recursive.extend_from_slice(symbols);
    self.add_rule(nt, &recursive)?;
    Ok(())
  }

  /// A separated list whose node keeps the items as direct children:
  ///
  /// ```text
  /// listOf(item) → item
  /// listOf(item) → listOf(item) separator item
  /// listOf(item) → ε                            (when allow_empty)
  /// ```
  ///
  /// The recursive rule replaces its children with the items of the inner
  /// list followed by the new item, dropping the separator, so `1, 2, 3`
  /// yields one node with three children.
  pub fn list(
    &mut self,
    allow_empty: bool,
    separator: SymbolId,
    item: SymbolId,
  ) -> Result<SymbolId, GrammarError> {
    let name = format!("listOf({})", self.symbol_name(item));
    let nt = self.symbols.fresh_nonterminal(&name);

    self.add_rule(nt, &[item])?;
    self.add_rule(nt, &[nt, separator, item])?
      .with_action(flatten_list);

    if allow_empty {
      self.add_empty_rule(nt)?;
    }

    Ok(nt)
  }
}

fn flatten_list(node: &mut InternalNode) {
  let mut children = std::mem::take(&mut node.children);
  let last = children.pop();

  let mut items = match children.into_iter().next() {
    Some(AstNode::Internal(inner)) => inner.children,
    Some(leaf) => vec![leaf],
    None => vec![],
  };
  items.extend(last);

  node.children = items;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{RuleId, Token};
  use pretty_assertions::assert_eq;

  fn clauses(g: &Grammar) -> Vec<String> {
    g.rules().iter().map(|r| r.display(g.symbols()).to_string()).collect()
  }

  #[test]
  fn one_of() {
    let mut g = Grammar::new();
    let a = g.terminal("a");
    let b = g.terminal("b");
    let nt = g.one_of(&[a, b]).unwrap();
    assert_eq!(g.symbol_name(nt), "oneOf(a, b)");
    assert_eq!(clauses(&g), vec!["oneOf(a, b) → a", "oneOf(a, b) → b"]);
  }

  #[test]
  fn optional() {
    let mut g = Grammar::new();
    let a = g.terminal("a");
    let b = g.terminal("b");
    g.optional(&[a, b]).unwrap();
    assert_eq!(clauses(&g), vec!["optional(a, b) → a b", "optional(a, b) → ε"]);
  }

  #[test]
  fn repetitions() {
    let mut g = Grammar::new();
    let a = g.terminal("a");
    g.one_or_more(&[a]).unwrap();
    g.zero_or_more(&[a]).unwrap();
    assert_eq!(clauses(&g), vec![
      "oneOrMore(a) → a",
      "oneOrMore(a) → oneOrMore(a) a",
      "zeroOrMore(a) → a",
      "zeroOrMore(a) → zeroOrMore(a) a",
      "zeroOrMore(a) → ε",
    ]);
  }

  #[test]
  fn same_shorthand_twice_gets_distinct_symbols() {
    let mut g = Grammar::new();
    let a = g.terminal("a");
    let first = g.one_or_more(&[a]).unwrap();
    let second = g.one_or_more(&[a]).unwrap();
    assert_ne!(first, second);
  }

  #[test]
  fn list_rules() {
    let mut g = Grammar::new();
    let comma = g.terminal(",");
    let int = g.terminal("int");
    g.list(true, comma, int).unwrap();
    assert_eq!(clauses(&g), vec![
      "listOf(int) → int",
      "listOf(int) → listOf(int) , int",
      "listOf(int) → ε",
    ]);
    assert!(g.rule_by_id(RuleId::from(1)).unwrap().action().is_some());
  }

  #[test]
  fn list_action_flattens() {
    let mut g = Grammar::new();
    let comma = g.terminal(",");
    let int = g.terminal("int");
    let list = g.list(false, comma, int).unwrap();

    let leaf = |text: &str, column| AstNode::Leaf(Token::new(int, text, 1, column));
    let sep = |column| AstNode::Leaf(Token::new(comma, ",", 1, column));

    let inner = InternalNode::new(RuleId::from(1), list, vec![leaf("1", 1), leaf("2", 3)]);
    let mut node = InternalNode::new(
      RuleId::from(1), list, vec![AstNode::Internal(inner), sep(4), leaf("3", 5)]);

    let action = g.rule_by_id(RuleId::from(1)).unwrap().action().unwrap().clone();
    action(&mut node);

    let texts = node.children.iter()
      .map(|child| child.as_token().map(|t| t.text.clone()).unwrap_or_default())
      .collect::<Vec<_>>();
    assert_eq!(texts, vec!["1", "2", "3"]);
  }
}
