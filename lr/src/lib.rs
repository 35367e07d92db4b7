//! LALR(1) table construction, a fingerprint-keyed table cache, and the
//! shift-reduce engine that turns a token stream into an `AstNode`.

mod token_set;
mod augment;
mod first;
mod builder;
mod lalr;
mod table;
mod config;
mod error;
mod parser;
pub mod cache;
pub mod report;

pub use grammar;

pub use self::table::{ActionTable, Action, StateId, ConflictResolution};
pub use self::config::CacheConfig;
pub use self::cache::ActionTableCache;
pub use self::error::{Error, ParseError};
pub use self::parser::LrParser;

use grammar::{Grammar, GrammarError};

/// Builds the LALR(1) table of `grammar`, accepting its target symbol.
///
/// Rule precedence levels are taken as they are; run
/// `Grammar::fix_precedence_levels` first to derive them from terminals.
pub fn build(grammar: &Grammar) -> Result<ActionTable, GrammarError> {
  Ok(builder::Builder::new(grammar)?.build())
}
