use grammar::{Grammar, SymbolId, RuleId, ConflictArbitration};
use log::debug;
use crate::augment::Symbol;
use crate::table::{ActionTable, Action, StateId, ConflictResolution};
use super::{Builder, decode_item};

/// Generates ACTION table and GOTO table.
///
/// entry in `ACTION[state][symbol]`:
/// - `None`: no action, a parse error
/// - `Some(Fail)`: a non-associative tie; also a parse error, but the cell
///   can no longer be filled by another item
///
/// Reduce items of ε-rules are also registered under the `ε` column, which
/// the parser falls back to when the lookahead has no action.
pub fn gen_tables(builder: &Builder) -> ActionTable {
  let grammar = builder.grammar;
  let lowered = &builder.lowered;
  let num_states = builder.states.len();
  let num_symbols = lowered.num_symbols;

  let mut actions = vec![vec![None; num_symbols]; num_states];
  let mut gotos = vec![vec![None; num_symbols]; num_states];
  let mut conflicts = vec![];

  for (from_state, state) in builder.states.values().enumerate() {
    let row = &mut actions[from_state];
    let from = StateId::from(from_state);

    for item in &state.items {
      let (prod_ix, dot) = decode_item(builder.max_nsym_p1, item.key);
      let prod = &lowered.prods[prod_ix];

      if dot < prod.symbols.len() {
        let sym = prod.symbols[dot];
        let to_state = match state.transitions.get(&sym) {
          Some(&to_state) => StateId::from(to_state as usize),
          None => continue,
        };

        match sym {
          Symbol::Token(token) => {
            put_action(grammar, row, &mut conflicts, from, token, Action::Shift(to_state));
          }
          Symbol::Nonterminal(nt) => {
            let nt = lowered.nt_symbol(nt);
            if let Some(cell) = gotos[from_state].get_mut(nt.index()) {
              *cell = Some(to_state);
            }
          }
        }
        continue;
      }

      let rule = match prod.rule {
        Some(rule) => rule,
        None => {
          put_action(grammar, row, &mut conflicts, from, SymbolId::EOF, Action::Accept);
          continue;
        }
      };

      for lookahead in item.lookaheads.iter() {
        put_action(grammar, row, &mut conflicts, from, lookahead, Action::Reduce(rule));
      }

      if prod.symbols.is_empty() {
        put_default_reduction(row, rule);
      }
    }
  }

  let expected = actions.iter()
    .map(|row| {
      row.iter()
        .enumerate()
        .filter(|(ix, action)| {
          matches!(action, Some(a) if *a != Action::Fail)
            && grammar.symbols().is_terminal(SymbolId::from(*ix))
        })
        .map(|(ix, _)| SymbolId::from(ix))
        .collect()
    })
    .collect();

  debug!("action table: {} states x {} symbols, {} conflicts resolved",
    num_states, num_symbols, conflicts.len());

  ActionTable {
    fingerprint: grammar.fingerprint(),
    num_symbols,
    actions,
    gotos,
    expected,
    conflicts,
  }
}

fn put_action(
  grammar: &Grammar,
  row: &mut [Option<Action>],
  conflicts: &mut Vec<ConflictResolution>,
  state: StateId,
  lookahead: SymbolId,
  incoming: Action,
) {
  let cell = match row.get_mut(lookahead.index()) {
    Some(cell) => cell,
    None => return,
  };

  let existing = match *cell {
    None => {
      *cell = Some(incoming);
      return;
    }
    Some(existing) if existing == incoming => return,
    // a non-associative tie stays an error
    Some(Action::Fail) => return,
    Some(existing) => existing,
  };

  let chosen = resolve_conflict(grammar, lookahead, existing, incoming);

  debug!("state {}: conflict on `{}` between {} and {}, chose {}",
    state, grammar.symbol_name(lookahead), existing, incoming, chosen);

  conflicts.push(ConflictResolution {
    state,
    lookahead,
    existing,
    incoming,
    chosen,
  });
  *cell = Some(chosen);
}

fn resolve_conflict(
  grammar: &Grammar,
  lookahead: SymbolId,
  existing: Action,
  incoming: Action,
) -> Action {
  match (existing, incoming) {
    (Action::Shift(to), Action::Reduce(rule))
    | (Action::Reduce(rule), Action::Shift(to)) => {
      match resolve_sr_conflict(grammar, rule, lookahead) {
        SrConflictResolution::Shift => Action::Shift(to),
        SrConflictResolution::Reduce => Action::Reduce(rule),
        SrConflictResolution::Fail => Action::Fail,
      }
    }
    (Action::Reduce(rule1), Action::Reduce(rule2)) => Action::Reduce(rule1.min(rule2)),
    // accepting behaves as the reduction of the lowest rule
    (Action::Accept, _) | (_, Action::Accept) => Action::Accept,
    (existing, _) => existing,
  }
}

enum SrConflictResolution {
  Shift,
  Reduce,
  Fail,
}

fn resolve_sr_conflict(
  grammar: &Grammar,
  rule: RuleId,
  token: SymbolId,
) -> SrConflictResolution {
  let (rule_prec, arbitration) = match grammar.rule_by_id(rule) {
    Some(rule) => (rule.precedence_level(), rule.arbitration()),
    None => (0, ConflictArbitration::Shift),
  };
  let token_prec = grammar.precedence_level(token);

  if token_prec > rule_prec {
    SrConflictResolution::Shift
  } else if rule_prec > token_prec {
    SrConflictResolution::Reduce
  } else {
    match arbitration {
      ConflictArbitration::Shift => SrConflictResolution::Shift,
      ConflictArbitration::Reduce => SrConflictResolution::Reduce,
      ConflictArbitration::Fail => SrConflictResolution::Fail,
    }
  }
}

/// Lowest rule wins the `ε` column.
fn put_default_reduction(row: &mut [Option<Action>], rule: RuleId) {
  if let Some(cell) = row.get_mut(SymbolId::EMPTY.index()) {
    match *cell {
      None => *cell = Some(Action::Reduce(rule)),
      Some(Action::Reduce(other)) if rule < other => *cell = Some(Action::Reduce(rule)),
      _ => {}
    }
  }
}
