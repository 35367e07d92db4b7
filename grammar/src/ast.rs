use std::fmt;
use crate::{Token, SymbolId, RuleId, SymbolTable};

/// Tree produced by the parser. Leaves wrap shifted tokens, internal nodes
/// are built when a rule is reduced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AstNode {
  Leaf(Token),
  Internal(InternalNode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalNode {
  pub rule: RuleId,
  /// Target of `rule`.
  pub symbol: SymbolId,
  pub children: Vec<AstNode>,
}

impl InternalNode {
  pub fn new(rule: RuleId, symbol: SymbolId, children: Vec<AstNode>) -> Self {
    InternalNode { rule, symbol, children }
  }
}

impl AstNode {
  pub fn symbol(&self) -> SymbolId {
    match self {
      AstNode::Leaf(token) => token.symbol,
      AstNode::Internal(node) => node.symbol,
    }
  }

  pub fn rule(&self) -> Option<RuleId> {
    match self {
      AstNode::Leaf(_) => None,
      AstNode::Internal(node) => Some(node.rule),
    }
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, AstNode::Leaf(_))
  }

  pub fn children(&self) -> &[AstNode] {
    match self {
      AstNode::Leaf(_) => &[],
      AstNode::Internal(node) => &node.children,
    }
  }

  pub fn first_child(&self) -> Option<&AstNode> {
    self.children().first()
  }

  pub fn last_child(&self) -> Option<&AstNode> {
    self.children().last()
  }

  /// The token of a leaf, or of an internal node that wraps exactly one
  /// child carrying a token.
  pub fn as_token(&self) -> Option<&Token> {
    let mut node = self;
    loop {
      match node {
        AstNode::Leaf(token) => return Some(token),
        AstNode::Internal(internal) if internal.children.len() == 1 => {
          node = &internal.children[0];
        }
        AstNode::Internal(_) => return None,
      }
    }
  }

  /// Tokens of all leaves, left to right.
  pub fn leaves(&self) -> Vec<&Token> {
    let mut leaves = vec![];
    let mut stack = vec![self];

    while let Some(node) = stack.pop() {
      match node {
        AstNode::Leaf(token) => leaves.push(token),
        AstNode::Internal(internal) => stack.extend(internal.children.iter().rev()),
      }
    }

    leaves
  }

  /// Renders the tree as an s-expression: `(E (T 1) + (T 2))`.
  pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> NodeDisplay<'a> {
    NodeDisplay { node: self, symbols }
  }
}

pub struct NodeDisplay<'a> {
  node: &'a AstNode,
  symbols: &'a SymbolTable,
}

enum Step<'a> {
  Enter(&'a AstNode),
  Close,
}

impl fmt::Display for NodeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let mut stack = vec![Step::Enter(self.node)];
    let mut first = true;

    while let Some(step) = stack.pop() {
      match step {
        Step::Enter(node) => {
          if !first {
            f.write_str(" ")?;
          }
          first = false;

          match node {
            AstNode::Leaf(token) => f.write_str(&token.text)?,
            AstNode::Internal(internal) => {
              write!(f, "({}", self.symbols.name(internal.symbol))?;
              stack.push(Step::Close);
              stack.extend(internal.children.iter().rev().map(Step::Enter));
            }
          }
        }
        Step::Close => f.write_str(")")?,
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn sample() -> (SymbolTable, AstNode) {
    let mut symbols = SymbolTable::new();
    let e = symbols.nonterminal("E");
    let t = symbols.nonterminal("T");
    let num = symbols.terminal("num");
    let plus = symbols.terminal("+");

    let leaf = |sym, text: &str, column| AstNode::Leaf(Token::new(sym, text, 1, column));
    let term = |text: &str, column| AstNode::Internal(InternalNode::new(
      RuleId::from(2), t, vec![leaf(num, text, column)]));

    let tree = AstNode::Internal(InternalNode::new(RuleId::from(1), e, vec![
      term("1", 1),
      leaf(plus, "+", 2),
      term("2", 3),
    ]));
    (symbols, tree)
  }

  #[test]
  fn leaves_in_order() {
    let (_, tree) = sample();
    let texts = tree.leaves().into_iter().map(|t| t.text.as_str()).collect::<Vec<_>>();
    assert_eq!(texts, vec!["1", "+", "2"]);
  }

  #[test]
  fn as_token_descends_single_children() {
    let (_, tree) = sample();
    assert_eq!(tree.first_child().unwrap().as_token().unwrap().text, "1");
    assert!(tree.as_token().is_none());
  }

  #[test]
  fn s_expression() {
    let (symbols, tree) = sample();
    assert_eq!(tree.display(&symbols).to_string(), "(E (T 1) + (T 2))");
  }

  #[test]
  fn empty_internal_node() {
    let mut symbols = SymbolTable::new();
    let opt = symbols.nonterminal("Opt");
    let node = AstNode::Internal(InternalNode::new(RuleId::from(0), opt, vec![]));
    assert_eq!(node.display(&symbols).to_string(), "(Opt)");
    assert!(node.leaves().is_empty());
  }
}
