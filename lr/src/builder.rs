use std::fmt::{self, Write};
use itertools::Itertools;
use grammar::{Grammar, GrammarError, Map};
use crate::augment::{self, LoweredGrammar, Symbol};
use crate::token_set::TokenSet;
use crate::table::ActionTable;

mod states;
mod tables;

/// States keyed by their sorted kernel item keys.
pub type StateStore = Map<Vec<u32>, State>;

pub type KernelItemSet = Vec<Item>;

#[derive(Debug, Clone)]
pub struct Item {
  /// encoded (production, dot)
  pub key: u32,
  pub lookaheads: TokenSet,
}

#[derive(Debug, Clone)]
pub struct State {
  /// Kernel items first, in key order, then closure items.
  pub items: Vec<Item>,
  pub transitions: Map<Symbol, u32>,
}

impl State {
  pub fn new(kernel: KernelItemSet) -> Self {
    State {
      items: kernel,
      transitions: Map::default(),
    }
  }
}

pub struct Builder<'a> {
  pub grammar: &'a Grammar,
  pub lowered: LoweredGrammar,
  /// maximum number of symbols of a production, plus one
  pub max_nsym_p1: usize,
  pub states: StateStore,
}

impl<'a> Builder<'a> {
  /// Fails when a non-terminal reachable from the target symbol has no rule.
  pub fn new(grammar: &'a Grammar) -> Result<Self, GrammarError> {
    grammar.check_defined()?;
    let lowered = augment::augment(grammar)?;
    let max_nsym_p1 = lowered.prods.iter()
      .map(|prod| prod.symbols.len())
      .max()
      .unwrap_or(0) + 1;

    Ok(Builder {
      grammar,
      lowered,
      max_nsym_p1,
      states: StateStore::default(),
    })
  }

  pub fn build_states(&mut self) {
    states::gen_states(self);
  }

  pub fn build(mut self) -> ActionTable {
    self.build_states();
    tables::gen_tables(&self)
  }

  pub fn fmt_item(&self, item: &Item, f: &mut impl Write) -> fmt::Result {
    let (prod_ix, dot) = decode_item(self.max_nsym_p1, item.key);
    let prod = &self.lowered.prods[prod_ix];
    let symbols = self.grammar.symbols();
    let nt = self.lowered.nt_symbol(prod.nt);

    if prod.rule.is_some() {
      write!(f, "{} →", symbols.name(nt))?;
    } else {
      f.write_str("^ →")?;
    }

    for (i, &sym) in prod.symbols.iter().enumerate() {
      if i == dot {
        f.write_str(" .")?;
      }
      write!(f, " {}", symbols.name(self.lowered.symbol_id(sym)))?;
    }
    if dot == prod.symbols.len() {
      f.write_str(" .")?;
    }

    write!(f, " [{}]", item.lookaheads.iter().map(|la| symbols.name(la)).join(", "))
  }

  pub fn fmt_states(&self, f: &mut impl Write) -> fmt::Result {
    for (ix, state) in self.states.values().enumerate() {
      writeln!(f, "State {}", ix)?;

      for item in &state.items {
        f.write_str("  ")?;
        self.fmt_item(item, f)?;
        writeln!(f)?;
      }

      for (&sym, &to) in &state.transitions {
        let name = self.grammar.symbol_name(self.lowered.symbol_id(sym));
        writeln!(f, "  {} => {}", name, to)?;
      }

      writeln!(f)?;
    }

    Ok(())
  }
}

pub fn encode_item(max_nsym_p1: usize, prod: usize, dot: usize) -> u32 {
  (prod * max_nsym_p1 + dot) as u32
}

pub fn decode_item(max_nsym_p1: usize, key: u32) -> (usize, usize) {
  let key = key as usize;
  (key / max_nsym_p1, key % max_nsym_p1)
}
