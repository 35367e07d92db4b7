use crate::builder::{StateStore, KernelItemSet, State};

/// Stores a kernel, merging its lookaheads into an existing state with the
/// same core.
///
/// `kernel_item_set` is sorted by the field `key`.
///
/// Returns the state index and whether the state has changed.
pub fn store_state(
  states: &mut StateStore,
  kernel_item_set: KernelItemSet,
) -> (u32, bool) {
  let kernel_key_set = kernel_item_set.iter()
    .map(|item| item.key)
    .collect::<Vec<_>>();

  if let Some(i) = states.get_index_of(&kernel_key_set) {
    let mut changed = false;
    for (item, new_item) in states[i].items.iter_mut().zip(kernel_item_set) {
      changed |= item.lookaheads.union_with(&new_item.lookaheads);
    }
    (i as u32, changed)
  } else {
    let state_ix = states.insert_full(
      kernel_key_set,
      State::new(kernel_item_set),
    ).0 as u32;

    (state_ix, true)
  }
}
