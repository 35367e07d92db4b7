//! Context-free grammar model: interned symbols, a rule arena addressed by
//! dense ids, a fluent construction DSL, and the AST produced by parsing.

mod error;
mod symbol;
mod rule;
mod grammar;
mod fingerprint;
mod token;
mod ast;

pub use self::error::*;
pub use self::symbol::{SymbolId, SymbolKind, SymbolTable};
pub use self::rule::{Rule, RuleId, RuleDisplay, Associativity, ConflictArbitration, ReduceAction};
pub use self::grammar::{Grammar, ComponentsSpecifier, RuleSpecifier};
pub use self::fingerprint::Fingerprint;
pub use self::token::{Token, LexicalError};
pub use self::ast::{AstNode, InternalNode, NodeDisplay};

pub type Map<K, V> = indexmap::IndexMap<K, V, fnv::FnvBuildHasher>;

pub type Set<K> = indexmap::IndexSet<K, fnv::FnvBuildHasher>;

pub type HashMap<K, V> = fnv::FnvHashMap<K, V>;

pub type BiMap<K, V> = bimap::BiHashMap<K, V>;
