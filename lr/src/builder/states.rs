use std::collections::VecDeque;
use grammar::{SymbolId, Map, HashMap};
use log::debug;
use crate::augment::{LoweredGrammar, Symbol};
use crate::first::{self, NonterminalFirst};
use crate::lalr;
use crate::token_set::TokenSet;
use super::{Builder, Item, State, encode_item, decode_item};

/// Discovers the states breadth-first from the closure of `^ → . S, {$}`.
/// A state is visited again whenever its kernel lookaheads grow, until
/// nothing changes.
pub fn gen_states(builder: &mut Builder) {
  let nt_firsts = first::compute(&builder.lowered);
  let grammar = &builder.lowered;
  let max_nsym_p1 = builder.max_nsym_p1;
  let states = &mut builder.states;

  let start_item_set = vec![
    Item {
      key: encode_item(max_nsym_p1, grammar.start_prod, 0),
      lookaheads: TokenSet::from_token(grammar.num_symbols, SymbolId::EOF),
    }
  ];

  let (start_state, _) = lalr::store_state(states, start_item_set);

  let mut queue = VecDeque::new();
  queue.push_back(start_state);

  while let Some(state_ix) = queue.pop_front() {
    let state = &mut states[state_ix as usize];
    compute_closure(grammar, &nt_firsts, max_nsym_p1, state);

    let transitions = compute_transitions(grammar, max_nsym_p1, state);
    for (sym, mut kernel_item_set) in transitions {
      kernel_item_set.sort_by_key(|item| item.key);

      let (next_state, changed) = lalr::store_state(states, kernel_item_set);
      if changed {
        queue.push_back(next_state);
      }
      states[state_ix as usize].transitions.insert(sym, next_state);
    }
  }

  debug!("{} LALR(1) states", states.len());
}

fn compute_closure(
  grammar: &LoweredGrammar,
  nt_firsts: &[NonterminalFirst],
  max_nsym_p1: usize,
  state: &mut State,
) {
  let items = &mut state.items;
  // nt -> start index of items
  let mut nt_starts = HashMap::default();
  let mut first = TokenSet::new(grammar.num_symbols);

  for (i, item) in items.iter().enumerate() {
    if let (prod, 0) = decode_item(max_nsym_p1, item.key) {
      nt_starts.entry(grammar.prods[prod].nt).or_insert(i);
    }
  }

  let mut i = 0;
  while i < items.len() {
    let (prod, dot) = decode_item(max_nsym_p1, items[i].key);
    let prod = &grammar.prods[prod];
    if dot == prod.symbols.len() {
      i += 1;
      continue;
    }

    if let Symbol::Nonterminal(nt) = prod.symbols[dot] {
      first.clear();
      first::compute_symbols_first(
        &mut first,
        nt_firsts,
        &prod.symbols[dot + 1..],
        Some(&items[i].lookaheads));

      if let Some(&nt_start) = nt_starts.get(&nt) {
        let mut changed = false;
        for j in nt_start .. nt_start + grammar.nt_range(nt).len() {
          changed |= items[j].lookaheads.union_with(&first);
        }

        if changed && i > nt_start {
          i = nt_start;
        } else if !changed {
          i += 1;
        }
      } else {
        nt_starts.insert(nt, items.len());

        for prod_ix in grammar.nt_range(nt) {
          items.push(Item {
            key: encode_item(max_nsym_p1, prod_ix, 0),
            lookaheads: first.clone(),
          });
        }

        i += 1;
      }
    } else {
      i += 1;
    }
  }
}

fn compute_transitions(
  grammar: &LoweredGrammar,
  max_nsym_p1: usize,
  state: &State,
) -> Map<Symbol, Vec<Item>> {
  let mut transitions = Map::<_, Vec<Item>>::default();

  for item in &state.items {
    let (prod_ix, dot) = decode_item(max_nsym_p1, item.key);
    let prod = &grammar.prods[prod_ix];
    if dot == prod.symbols.len() {
      continue;
    }

    let next_item = encode_item(max_nsym_p1, prod_ix, dot + 1);
    transitions.entry(prod.symbols[dot])
      .or_default()
      .push(Item {
        key: next_item,
        lookaheads: item.lookaheads.clone(),
      });
  }

  transitions
}
