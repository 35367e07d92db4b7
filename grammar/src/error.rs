use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
  #[error(transparent)]
  InvalidGrammar(#[from] InvalidGrammarError),
  #[error(transparent)]
  UndefinedSymbol(#[from] UndefinedSymbolError),
}

/// The grammar is malformed in a way the author has to fix before any table
/// can be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid grammar: {message}")]
pub struct InvalidGrammarError {
  pub message: String,
}

impl InvalidGrammarError {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }
}

/// A non-terminal has no defining rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("undefined symbol `{symbol}`{}", fmt_referenced_by(.referenced_by))]
pub struct UndefinedSymbolError {
  pub symbol: String,
  /// The rule whose clause mentions the symbol, if any.
  pub referenced_by: Option<String>,
}

fn fmt_referenced_by(rule: &Option<String>) -> String {
  match rule {
    Some(rule) => format!(" (referenced by `{}`)", rule),
    None => String::new(),
  }
}
