use std::fmt;
use thiserror::Error;
use grammar::{GrammarError, LexicalError, SymbolId, RuleId, Token};
use crate::table::StateId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error(transparent)]
  Grammar(#[from] GrammarError),
  #[error(transparent)]
  Parse(#[from] ParseError),
  #[error(transparent)]
  Lexical(#[from] LexicalError),
  /// The table does not belong to the grammar driving it.
  #[error("no rule #{rule} in the grammar driving the table")]
  MissingRule {
    rule: RuleId,
  },
  #[error("no goto entry from state {state} on symbol #{}", .symbol.id())]
  MissingGoto {
    state: StateId,
    symbol: SymbolId,
  },
}

/// No action for the current token. `expected` holds the terminals that
/// would have been accepted, by name, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
  pub token: Token,
  /// name of the token's terminal
  pub token_type: String,
  pub expected: Vec<String>,
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "Parse error : ({}:{})", self.token.line, self.token.column)?;

    match self.expected.as_slice() {
      [] => return Ok(()),
      [single] => write!(f, " : expected {}", single)?,
      several => write!(f, " : expected one of [{}]", several.join(", "))?,
    }

    write!(f, " ( got {}", self.token_type)?;
    if !self.token.text.is_empty() {
      write!(f, " '{}'", self.token.text)?;
    }
    f.write_str(" instead)")
  }
}
