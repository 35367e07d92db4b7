//! Two-tier memoization of table construction, keyed by grammar
//! fingerprint: an in-memory map first, then record files on disk.
//!
//! Faults of either tier are logged and answered by building the table
//! again; they never reach the caller.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use thiserror::Error;
use grammar::{Fingerprint, Grammar, GrammarError};
use crate::config::CacheConfig;
use crate::table::ActionTable;

mod memory;
mod disk;

use self::memory::MemoryCache;
use self::disk::DiskCache;

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("cache i/o error: {0}")]
  Io(#[from] io::Error),
  #[error("corrupted cache record {}: {reason}", .path.display())]
  Corrupted {
    path: PathBuf,
    reason: String,
  },
  #[error("cache serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

static GLOBAL: Lazy<ActionTableCache> = Lazy::new(|| {
  ActionTableCache::new(CacheConfig::from_env())
});

pub struct ActionTableCache {
  enabled: AtomicBool,
  config: CacheConfig,
  memory: MemoryCache,
  disk: Option<DiskCache>,
}

impl ActionTableCache {
  pub fn new(config: CacheConfig) -> Self {
    ActionTableCache {
      enabled: AtomicBool::new(config.enabled),
      memory: MemoryCache::new(config.memory_ttl),
      disk: config.directory.clone().map(|dir| DiskCache::new(dir, config.disk_ttl)),
      config,
    }
  }

  /// A cache that always builds.
  pub fn disabled() -> Self {
    Self::new(CacheConfig::disabled())
  }

  /// The process-wide cache, configured from the environment on first use.
  pub fn global() -> &'static ActionTableCache {
    &GLOBAL
  }

  pub fn config(&self) -> &CacheConfig {
    &self.config
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled.load(Ordering::Relaxed)
  }

  /// Turns caching on or off without dropping stored tables.
  pub fn set_enabled(&self, enabled: bool) {
    self.enabled.store(enabled, Ordering::Relaxed);
  }

  /// Number of tables held in memory.
  pub fn memory_len(&self) -> usize {
    self.memory.len()
  }

  pub fn clear_memory(&self) {
    self.memory.clear();
  }

  /// Record file of the disk tier for `fingerprint`, if the disk tier is on.
  pub fn record_path(&self, fingerprint: &Fingerprint) -> Option<PathBuf> {
    self.disk.as_ref().map(|disk| disk.path(fingerprint))
  }

  /// The table of `grammar`, from memory, from disk, or freshly built.
  /// Grammar errors are the only failures.
  pub fn get_or_build(&self, grammar: &Grammar) -> Result<Arc<ActionTable>, GrammarError> {
    if !self.is_enabled() {
      return crate::build(grammar).map(Arc::new);
    }

    let fingerprint = grammar.fingerprint();

    if let Some(table) = self.memory.get(&fingerprint) {
      debug!("action table {}: memory hit", fingerprint);
      return Ok(table);
    }

    if let Some(disk) = &self.disk {
      match disk.load(&fingerprint) {
        Ok(Some(table)) => {
          debug!("action table {}: disk hit", fingerprint);
          return Ok(self.memory.insert(Arc::new(table)));
        }
        Ok(None) => {}
        Err(err) => warn!("ignoring cached action table {}: {}", fingerprint, err),
      }
    }

    debug!("action table {}: building", fingerprint);
    let table = self.memory.insert(Arc::new(crate::build(grammar)?));

    if let Some(disk) = &self.disk {
      if let Err(err) = disk.store(&table) {
        error!("cannot persist action table {}: {}", fingerprint, err);
      }
    }

    Ok(table)
  }
}
