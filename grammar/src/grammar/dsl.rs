use std::sync::Arc;
use crate::{
  Grammar, GrammarError, SymbolId, RuleId, Associativity, ConflictArbitration,
  InternalNode,
};

/// `grammar.target(sym)`: the rule's target is known, its clause is not.
pub struct ComponentsSpecifier<'g> {
  grammar: &'g mut Grammar,
  target: SymbolId,
}

impl<'g> ComponentsSpecifier<'g> {
  pub(super) fn new(grammar: &'g mut Grammar, target: SymbolId) -> Self {
    ComponentsSpecifier { grammar, target }
  }

  pub fn def(self, clause: &[SymbolId]) -> Result<RuleSpecifier<'g>, GrammarError> {
    self.grammar.add_rule(self.target, clause)
  }
}

/// Extra settings of a rule that was just added.
pub struct RuleSpecifier<'g> {
  grammar: &'g mut Grammar,
  rule: RuleId,
}

impl<'g> RuleSpecifier<'g> {
  pub(super) fn new(grammar: &'g mut Grammar, rule: RuleId) -> Self {
    RuleSpecifier { grammar, rule }
  }

  /// Runs `action` on the node built each time the rule is reduced.
  pub fn with_action<F>(self, action: F) -> Self
    where F: Fn(&mut InternalNode) + Send + Sync + 'static
  {
    self.grammar.rule_mut(self.rule).action = Some(Arc::new(action));
    self
  }

  pub fn with_name(self, name: impl Into<String>) -> Self {
    self.grammar.rule_mut(self.rule).name = Some(name.into());
    self
  }

  /// Overrides the level the rule would inherit from its terminals.
  pub fn with_precedence_level(self, level: u32) -> Self {
    self.grammar.rule_mut(self.rule).explicit_precedence = Some(level);
    self
  }

  pub fn with_associativity(self, assoc: Associativity) -> Self {
    self.grammar.rule_mut(self.rule).arbitration = assoc.into();
    self
  }

  pub fn prefer_shift_over_reduce(self) -> Self {
    self.grammar.rule_mut(self.rule).arbitration = ConflictArbitration::Shift;
    self
  }

  pub fn prefer_reduce_over_shift(self) -> Self {
    self.grammar.rule_mut(self.rule).arbitration = ConflictArbitration::Reduce;
    self
  }

  pub fn get(&self) -> RuleId {
    self.rule
  }
}
