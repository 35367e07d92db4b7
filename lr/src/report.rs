//! Human-readable dumps of the automaton and of the conflicts resolved while
//! filling the table.

use std::fmt::Write;
use grammar::{Grammar, GrammarError};
use crate::builder::Builder;
use crate::table::{ActionTable, Action, ConflictResolution};

/// Item sets and transitions of every state.
pub fn report_states(grammar: &Grammar) -> Result<String, GrammarError> {
  let mut builder = Builder::new(grammar)?;
  builder.build_states();

  let mut buf = String::new();
  // writing into a String cannot fail
  let _ = builder.fmt_states(&mut buf);
  Ok(buf)
}

/// One paragraph per conflict resolved in `table`, which must have been
/// built from `grammar`.
pub fn report_conflicts(grammar: &Grammar, table: &ActionTable) -> String {
  let mut buf = String::new();

  for conflict in table.conflicts() {
    let _ = fmt_conflict(grammar, conflict, &mut buf);
  }

  buf
}

fn fmt_conflict(
  grammar: &Grammar,
  conflict: &ConflictResolution,
  buf: &mut String,
) -> std::fmt::Result {
  let kind = match (conflict.existing, conflict.incoming) {
    (Action::Reduce(_), Action::Reduce(_)) => "reduce-reduce",
    (Action::Accept, _) | (_, Action::Accept) => "accept-reduce",
    _ => "shift-reduce",
  };

  writeln!(buf,
    "{} conflict at state {} when the lookahead is {}:\n",
    kind,
    conflict.state,
    grammar.symbol_name(conflict.lookahead),
  )?;

  for action in [conflict.existing, conflict.incoming] {
    writeln!(buf, "  {}", describe(grammar, action))?;
  }

  writeln!(buf, "\nresolved as: {}\n", describe(grammar, conflict.chosen))
}

fn describe(grammar: &Grammar, action: Action) -> String {
  match action {
    Action::Reduce(rule) => match grammar.rule_by_id(rule) {
      Some(r) => format!("reduce by ({}) {}", rule, r.display(grammar.symbols())),
      None => format!("reduce by ({})", rule),
    },
    Action::Shift(state) => format!("shift and go to state {}", state),
    Action::Accept => "accept".to_owned(),
    Action::Fail => "error".to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use insta::assert_snapshot;

  #[test]
  fn dangling_else() {
    // S → i S | i S e S | x
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let i = g.terminal("i");
    let e = g.terminal("e");
    let x = g.terminal("x");
    g.target(s).def(&[i, s]).unwrap();
    g.target(s).def(&[i, s, e, s]).unwrap();
    g.target(s).def(&[x]).unwrap();

    let table = crate::build(&g).unwrap();
    assert_eq!(table.conflicts().len(), 1);
    assert_snapshot!(report_conflicts(&g, &table), @r###"
    shift-reduce conflict at state 4 when the lookahead is e:

      reduce by (0) S → i S
      shift and go to state 5

    resolved as: shift and go to state 5
    "###);
  }

  #[test]
  fn states_of_undefined_grammar() {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let a = g.nonterminal("A");
    g.target(s).def(&[a]).unwrap();
    assert!(report_states(&g).is_err());
  }
}
