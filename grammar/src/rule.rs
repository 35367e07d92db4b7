use serde::{Serialize, Deserialize};
use std::fmt;
use std::sync::Arc;
use crate::{SymbolId, SymbolTable, InternalNode};

/// Dense rule identity. Id 0 is the rule accepted by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(u32);

impl RuleId {
  pub const TARGET: RuleId = RuleId(0);

  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<usize> for RuleId {
  fn from(ix: usize) -> Self {
    RuleId(ix as u32)
  }
}

impl fmt::Display for RuleId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
  Left,
  Right,
  NonAssoc,
}

/// Tie-break applied when a shift/reduce conflict has equal precedence on both
/// sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictArbitration {
  Shift,
  Reduce,
  Fail,
}

impl From<Associativity> for ConflictArbitration {
  fn from(assoc: Associativity) -> Self {
    match assoc {
      Associativity::Left => ConflictArbitration::Reduce,
      Associativity::Right => ConflictArbitration::Shift,
      Associativity::NonAssoc => ConflictArbitration::Fail,
    }
  }
}

/// Callback run on the freshly built node each time its rule is reduced.
pub type ReduceAction = Arc<dyn Fn(&mut InternalNode) + Send + Sync>;

#[derive(Clone)]
pub struct Rule {
  pub(crate) id: RuleId,
  pub(crate) target: SymbolId,
  pub(crate) clause: Vec<SymbolId>,
  pub(crate) name: Option<String>,
  pub(crate) action: Option<ReduceAction>,
  /// set by `with_precedence_level`, wins over the inherited level.
  pub(crate) explicit_precedence: Option<u32>,
  pub(crate) inherited_precedence: Option<u32>,
  pub(crate) arbitration: ConflictArbitration,
}

impl Rule {
  pub(crate) fn new(id: RuleId, target: SymbolId, clause: Vec<SymbolId>) -> Self {
    Rule {
      id,
      target,
      clause,
      name: None,
      action: None,
      explicit_precedence: None,
      inherited_precedence: None,
      arbitration: ConflictArbitration::Shift,
    }
  }

  pub fn id(&self) -> RuleId {
    self.id
  }

  pub fn target(&self) -> SymbolId {
    self.target
  }

  /// The clause as declared; an empty clause is the single `ε` symbol.
  pub fn clause(&self) -> &[SymbolId] {
    &self.clause
  }

  /// The symbols a parser actually consumes for this rule.
  pub fn symbols(&self) -> &[SymbolId] {
    if self.is_empty() {
      &[]
    } else {
      &self.clause
    }
  }

  pub fn arity(&self) -> usize {
    self.symbols().len()
  }

  pub fn is_empty(&self) -> bool {
    self.clause.iter().all(|&sym| sym == SymbolId::EMPTY)
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn action(&self) -> Option<&ReduceAction> {
    self.action.as_ref()
  }

  pub fn precedence_level(&self) -> u32 {
    self.explicit_precedence
      .or(self.inherited_precedence)
      .unwrap_or(0)
  }

  pub fn arbitration(&self) -> ConflictArbitration {
    self.arbitration
  }

  pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> RuleDisplay<'a> {
    RuleDisplay { rule: self, symbols }
  }
}

impl fmt::Debug for Rule {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Rule")
      .field("id", &self.id)
      .field("target", &self.target)
      .field("clause", &self.clause)
      .field("name", &self.name)
      .field("action", &self.action.is_some())
      .field("precedence", &self.precedence_level())
      .field("arbitration", &self.arbitration)
      .finish()
  }
}

pub struct RuleDisplay<'a> {
  rule: &'a Rule,
  symbols: &'a SymbolTable,
}

impl fmt::Display for RuleDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} →", self.symbols.name(self.rule.target))?;
    for &sym in &self.rule.clause {
      write!(f, " {}", self.symbols.name(sym))?;
    }
    Ok(())
  }
}
