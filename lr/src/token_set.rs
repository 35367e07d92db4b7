use bitvec::prelude::*;
use grammar::SymbolId;
use std::fmt;

/// Lookahead set over terminal ids.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenSet(BitVec);

impl TokenSet {
  pub fn new(len: usize) -> Self {
    TokenSet(bitvec![0; len])
  }

  pub fn from_token(len: usize, token: SymbolId) -> Self {
    let mut set = Self::new(len);
    set.insert(token);
    set
  }

  /// Returns whether the token was absent.
  pub fn insert(&mut self, token: SymbolId) -> bool {
    !self.0.replace(token.index(), true)
  }

  /// Returns whether `self` has changed.
  pub fn union_with(&mut self, other: &TokenSet) -> bool {
    let mut changed = false;
    for (x, y) in self.0.as_raw_mut_slice().iter_mut().zip(other.0.as_raw_slice()) {
      let new = *x | *y;
      changed |= new != *x;
      *x = new;
    }
    changed
  }

  pub fn clear(&mut self) {
    self.0.fill(false);
  }

  pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
    self.0.iter_ones().map(SymbolId::from)
  }
}

impl fmt::Debug for TokenSet {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter().map(SymbolId::id)).finish()
  }
}
