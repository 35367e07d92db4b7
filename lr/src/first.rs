//! compute FIRST and NULLABLE sets.

use crate::augment::{LoweredGrammar, Symbol};
use crate::token_set::TokenSet;

#[derive(Debug, Clone)]
pub struct NonterminalFirst {
  pub first: TokenSet,
  pub nullable: bool,
}

/// Indexed by non-terminal index of the lowered grammar. Computed as a fixed
/// point over all productions, so left recursion and mutual recursion need
/// no special care.
pub fn compute(grammar: &LoweredGrammar) -> Vec<NonterminalFirst> {
  let mut nt_firsts = vec![
    NonterminalFirst {
      first: TokenSet::new(grammar.num_symbols),
      nullable: false,
    };
    grammar.nts.len()
  ];
  let mut first = TokenSet::new(grammar.num_symbols);

  loop {
    let mut changed = false;

    for prod in &grammar.prods {
      first.clear();
      let nullable = compute_symbols_first(&mut first, &nt_firsts, &prod.symbols, None);

      let nt_first = &mut nt_firsts[prod.nt];
      changed |= nt_first.first.union_with(&first);
      if nullable && !nt_first.nullable {
        nt_first.nullable = true;
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  nt_firsts
}

/// Adds FIRST(`symbols` `lookaheads`) to `first`. Returns whether `symbols`
/// is nullable.
pub fn compute_symbols_first(
  first: &mut TokenSet,
  nt_firsts: &[NonterminalFirst],
  symbols: &[Symbol],
  lookaheads: Option<&TokenSet>,
) -> bool {
  for sym in symbols {
    match *sym {
      Symbol::Token(token) => {
        first.insert(token);
        return false;
      }
      Symbol::Nonterminal(nt) => {
        let nt_first = &nt_firsts[nt];
        first.union_with(&nt_first.first);
        if !nt_first.nullable {
          return false;
        }
      }
    }
  }

  if let Some(lookaheads) = lookaheads {
    first.union_with(lookaheads);
  }

  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::augment::augment;
  use grammar::{Grammar, SymbolId};
  use pretty_assertions::assert_eq;

  fn firsts(g: &Grammar) -> Vec<(String, Vec<String>, bool)> {
    let lowered = augment(g).unwrap();
    compute(&lowered).into_iter().enumerate().skip(1).map(|(nt, f)| {
      let name = g.symbol_name(lowered.nt_symbol(nt)).to_owned();
      let first = f.first.iter().map(|t| g.symbol_name(t).to_owned()).collect();
      (name, first, f.nullable)
    }).collect()
  }

  #[test]
  fn nullable_chain() {
    // Z → d | X Y Z ; Y → ε | c ; X → Y | a
    let mut g = Grammar::new();
    let z = g.nonterminal("Z");
    let x = g.nonterminal("X");
    let y = g.nonterminal("Y");
    let a = g.terminal("a");
    let c = g.terminal("c");
    let d = g.terminal("d");
    g.target(z).def(&[d]).unwrap();
    g.target(z).def(&[x, y, z]).unwrap();
    g.add_empty_rule(y).unwrap();
    g.target(y).def(&[c]).unwrap();
    g.target(x).def(&[y]).unwrap();
    g.target(x).def(&[a]).unwrap();

    let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
    assert_eq!(firsts(&g), vec![
      ("Z".to_owned(), s(&["a", "c", "d"]), false),
      ("Y".to_owned(), s(&["c"]), true),
      ("X".to_owned(), s(&["a", "c"]), true),
    ]);
  }

  #[test]
  fn left_recursion() {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    let plus = g.terminal("+");
    let num = g.terminal("num");
    g.target(e).def(&[e, plus, e]).unwrap();
    g.target(e).def(&[num]).unwrap();

    let lowered = augment(&g).unwrap();
    let nt_firsts = compute(&lowered);
    assert_eq!(nt_firsts[1].first.iter().collect::<Vec<_>>(), vec![num]);
    assert!(!nt_firsts[1].nullable);

    let mut first = TokenSet::new(lowered.num_symbols);
    let la = TokenSet::from_token(lowered.num_symbols, SymbolId::EOF);
    assert!(compute_symbols_first(&mut first, &nt_firsts, &[], Some(&la)));
    assert_eq!(first.iter().collect::<Vec<_>>(), vec![SymbolId::EOF]);
  }
}
