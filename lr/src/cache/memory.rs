use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use grammar::{Fingerprint, HashMap};
use crate::table::ActionTable;

/// Tables kept for `ttl` after they were stored.
pub struct MemoryCache {
  ttl: Duration,
  entries: Mutex<HashMap<Fingerprint, (Instant, Arc<ActionTable>)>>,
}

impl MemoryCache {
  pub fn new(ttl: Duration) -> Self {
    MemoryCache {
      ttl,
      entries: Mutex::new(HashMap::default()),
    }
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<Fingerprint, (Instant, Arc<ActionTable>)>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<ActionTable>> {
    self.get_at(fingerprint, Instant::now())
  }

  fn get_at(&self, fingerprint: &Fingerprint, now: Instant) -> Option<Arc<ActionTable>> {
    let mut entries = self.entries();
    match entries.get(fingerprint) {
      Some((stored, table)) if now.saturating_duration_since(*stored) < self.ttl => {
        Some(table.clone())
      }
      Some(_) => {
        entries.remove(fingerprint);
        None
      }
      None => None,
    }
  }

  /// Keeps an unexpired entry already stored under the same key, so that
  /// concurrent builders end up sharing the first table.
  pub fn insert(&self, table: Arc<ActionTable>) -> Arc<ActionTable> {
    self.insert_at(table, Instant::now())
  }

  fn insert_at(&self, table: Arc<ActionTable>, now: Instant) -> Arc<ActionTable> {
    let mut entries = self.entries();
    let ttl = self.ttl;
    let entry = entries.entry(table.fingerprint())
      .or_insert_with(|| (now, table.clone()));
    if now.saturating_duration_since(entry.0) >= ttl {
      *entry = (now, table);
    }
    entry.1.clone()
  }

  pub fn len(&self) -> usize {
    self.entries().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&self) {
    self.entries().clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::Grammar;

  fn table() -> Arc<ActionTable> {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let x = g.terminal("x");
    g.target(s).def(&[x]).unwrap();
    Arc::new(crate::build(&g).unwrap())
  }

  #[test]
  fn entries_expire() {
    let cache = MemoryCache::new(Duration::from_secs(60));
    let table = table();
    let fingerprint = table.fingerprint();
    let now = Instant::now();

    cache.insert_at(table, now);
    assert!(cache.get_at(&fingerprint, now + Duration::from_secs(59)).is_some());
    assert!(cache.get_at(&fingerprint, now + Duration::from_secs(60)).is_none());
    assert!(cache.is_empty());
  }

  #[test]
  fn first_insert_wins() {
    let cache = MemoryCache::new(Duration::from_secs(60));
    let first = table();
    let second = table();

    let kept = cache.insert(first.clone());
    assert!(Arc::ptr_eq(&kept, &first));
    let kept = cache.insert(second);
    assert!(Arc::ptr_eq(&kept, &first));
    assert_eq!(cache.len(), 1);
  }
}
