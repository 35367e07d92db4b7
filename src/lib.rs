//! LALR(1) parser generation over grammars built at run time.
//!
//! The `grammar` crate holds the grammar model and the trees produced by
//! parsing; the `lr` crate builds, caches and drives the action tables.

pub use grammar;
pub use lr;

pub mod calc;
