use thiserror::Error;
use crate::SymbolId;

/// A lexed terminal with its 1-based position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
  pub symbol: SymbolId,
  pub text: String,
  pub line: u32,
  pub column: u32,
}

impl Token {
  pub fn new(symbol: SymbolId, text: impl Into<String>, line: u32, column: u32) -> Self {
    Token {
      symbol,
      text: text.into(),
      line,
      column,
    }
  }

  pub fn eof(line: u32, column: u32) -> Self {
    Token::new(SymbolId::EOF, "", line, column)
  }

  pub fn is_eof(&self) -> bool {
    self.symbol == SymbolId::EOF
  }
}

/// Raised by a lexer feeding the parser; the parser hands it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexical error : ({line}:{column}) : {message}")]
pub struct LexicalError {
  pub message: String,
  pub line: u32,
  pub column: u32,
}
