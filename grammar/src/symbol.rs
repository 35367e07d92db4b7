use serde::{Serialize, Deserialize};
use std::fmt;
use crate::BiMap;

/// Dense identity of a terminal or non-terminal within a symbol table.
///
/// Equality is by id: two symbols with the same name but different kinds are
/// different symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(u32);

impl SymbolId {
  /// End of input. Always interned first.
  pub const EOF: SymbolId = SymbolId(0);
  /// The ε pseudo-terminal standing for an empty clause.
  pub const EMPTY: SymbolId = SymbolId(1);

  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<usize> for SymbolId {
  fn from(ix: usize) -> Self {
    SymbolId(ix as u32)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
  Terminal,
  Nonterminal,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SymbolKey {
  kind: SymbolKind,
  name: String,
}

/// Interns symbol names per kind.
#[derive(Clone)]
pub struct SymbolTable {
  symbols: BiMap<SymbolId, SymbolKey>,
}

impl SymbolTable {
  pub fn new() -> Self {
    let mut table = SymbolTable {
      symbols: BiMap::default(),
    };
    table.intern(SymbolKind::Terminal, "$");
    table.intern(SymbolKind::Terminal, "ε");
    table
  }

  pub fn terminal(&mut self, name: &str) -> SymbolId {
    self.intern(SymbolKind::Terminal, name)
  }

  pub fn nonterminal(&mut self, name: &str) -> SymbolId {
    self.intern(SymbolKind::Nonterminal, name)
  }

  /// Interns a non-terminal whose name is not yet taken, suffixing `base`
  /// with `#n` when needed.
  pub fn fresh_nonterminal(&mut self, base: &str) -> SymbolId {
    let mut name = base.to_owned();
    let mut n = 1;
    while self.lookup(SymbolKind::Nonterminal, &name).is_some() {
      n += 1;
      name = format!("{}#{}", base, n);
    }
    self.intern(SymbolKind::Nonterminal, &name)
  }

  pub fn lookup(&self, kind: SymbolKind, name: &str) -> Option<SymbolId> {
    let key = SymbolKey {
      kind,
      name: name.to_owned(),
    };
    self.symbols.get_by_right(&key).copied()
  }

  fn intern(&mut self, kind: SymbolKind, name: &str) -> SymbolId {
    if let Some(id) = self.lookup(kind, name) {
      return id;
    }

    let id = SymbolId::from(self.symbols.len());
    self.symbols.insert(id, SymbolKey {
      kind,
      name: name.to_owned(),
    });
    id
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  pub fn contains(&self, symbol: SymbolId) -> bool {
    symbol.index() < self.symbols.len()
  }

  pub fn name(&self, symbol: SymbolId) -> &str {
    self.symbols.get_by_left(&symbol)
      .map(|key| key.name.as_str())
      .unwrap_or("?")
  }

  pub fn kind(&self, symbol: SymbolId) -> Option<SymbolKind> {
    self.symbols.get_by_left(&symbol).map(|key| key.kind)
  }

  pub fn is_terminal(&self, symbol: SymbolId) -> bool {
    self.kind(symbol) == Some(SymbolKind::Terminal)
  }

  pub fn is_nonterminal(&self, symbol: SymbolId) -> bool {
    self.kind(symbol) == Some(SymbolKind::Nonterminal)
  }

  /// All symbols in id order.
  pub fn iter(&self) -> impl Iterator<Item = (SymbolId, SymbolKind, &str)> + '_ {
    (0..self.symbols.len()).filter_map(move |ix| {
      let id = SymbolId::from(ix);
      self.symbols.get_by_left(&id).map(|key| (id, key.kind, key.name.as_str()))
    })
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for SymbolTable {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_map()
      .entries(self.iter().map(|(id, _, name)| (id.id(), name)))
      .finish()
  }
}
