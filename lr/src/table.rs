use serde::{Serialize, Deserialize};
use std::fmt;
use grammar::{Fingerprint, SymbolId, RuleId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(u32);

impl StateId {
  pub const START: StateId = StateId(0);

  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<usize> for StateId {
  fn from(ix: usize) -> Self {
    StateId(ix as u32)
  }
}

impl fmt::Display for StateId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
  Shift(StateId),
  Reduce(RuleId),
  Accept,
  /// An explicit error entry, left by a non-associative tie.
  Fail,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Action::Shift(state) => write!(f, "shift {}", state),
      Action::Reduce(rule) => write!(f, "reduce {}", rule),
      Action::Accept => f.write_str("accept"),
      Action::Fail => f.write_str("fail"),
    }
  }
}

/// A table cell that received two candidate actions during construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
  pub state: StateId,
  pub lookahead: SymbolId,
  /// The action already in the cell.
  pub existing: Action,
  pub incoming: Action,
  pub chosen: Action,
}

/// ACTION and GOTO tables of an LALR(1) automaton. Rows are indexed by
/// state, columns by symbol id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTable {
  pub(crate) fingerprint: Fingerprint,
  pub(crate) num_symbols: usize,
  pub(crate) actions: Vec<Vec<Option<Action>>>,
  pub(crate) gotos: Vec<Vec<Option<StateId>>>,
  /// terminals whose action is not `Fail`, per state, in id order
  pub(crate) expected: Vec<Vec<SymbolId>>,
  pub(crate) conflicts: Vec<ConflictResolution>,
}

impl ActionTable {
  /// Fingerprint of the grammar this table was built from.
  pub fn fingerprint(&self) -> Fingerprint {
    self.fingerprint
  }

  pub fn num_states(&self) -> usize {
    self.actions.len()
  }

  pub fn num_symbols(&self) -> usize {
    self.num_symbols
  }

  /// `None` when the cell is undefined, including out-of-range lookups.
  pub fn action(&self, state: StateId, symbol: SymbolId) -> Option<Action> {
    self.actions.get(state.index())?.get(symbol.index()).copied().flatten()
  }

  pub fn goto(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
    self.gotos.get(state.index())?.get(symbol.index()).copied().flatten()
  }

  pub fn expected(&self, state: StateId) -> &[SymbolId] {
    self.expected.get(state.index()).map_or(&[], Vec::as_slice)
  }

  pub fn conflicts(&self) -> &[ConflictResolution] {
    &self.conflicts
  }

  /// Checks that all rows have the declared width.
  pub(crate) fn is_well_formed(&self) -> bool {
    self.actions.len() == self.gotos.len()
      && self.actions.len() == self.expected.len()
      && self.actions.iter().all(|row| row.len() == self.num_symbols)
      && self.gotos.iter().all(|row| row.len() == self.num_symbols)
  }
}
