use std::env;
use std::path::PathBuf;
use std::time::Duration;
use directories::ProjectDirs;

pub const CACHE_ENV: &str = "PARSERGENS_CACHE";
pub const CACHE_DIR_ENV: &str = "PARSERGENS_CACHE_DIR";

/// Settings of an `ActionTableCache`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
  /// When `false`, every request builds a fresh table.
  pub enabled: bool,
  pub memory_ttl: Duration,
  pub disk_ttl: Duration,
  /// Directory of the persisted tier; `None` keeps tables in memory only.
  pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    CacheConfig {
      enabled: true,
      memory_ttl: Duration::from_secs(10 * 60),
      disk_ttl: Duration::from_secs(60 * 60),
      directory: default_directory(),
    }
  }
}

impl CacheConfig {
  /// In-memory tier only.
  pub fn memory_only() -> Self {
    CacheConfig {
      directory: None,
      ..Self::default()
    }
  }

  pub fn disabled() -> Self {
    CacheConfig {
      enabled: false,
      directory: None,
      ..Self::default()
    }
  }

  /// The default settings, overridden by `PARSERGENS_CACHE` (`0`, `off`,
  /// `false` or `no` disable the cache) and `PARSERGENS_CACHE_DIR` (an empty
  /// value disables the disk tier).
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(value) = env::var(CACHE_ENV) {
      if is_off(&value) {
        config.enabled = false;
      }
    }

    if let Some(dir) = env::var_os(CACHE_DIR_ENV) {
      config.directory = if dir.is_empty() {
        None
      } else {
        Some(PathBuf::from(dir))
      };
    }

    config
  }

  pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
    self.directory = Some(directory.into());
    self
  }

  pub fn with_memory_ttl(mut self, ttl: Duration) -> Self {
    self.memory_ttl = ttl;
    self
  }

  pub fn with_disk_ttl(mut self, ttl: Duration) -> Self {
    self.disk_ttl = ttl;
    self
  }
}

fn default_directory() -> Option<PathBuf> {
  ProjectDirs::from("", "", "parsergens")
    .map(|dirs| dirs.cache_dir().join("action-tables"))
}

fn is_off(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "off" | "false" | "no")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn switch_values() {
    assert!(is_off("0"));
    assert!(is_off(" OFF "));
    assert!(is_off("no"));
    assert!(!is_off("1"));
    assert!(!is_off("on"));
  }

  #[test]
  fn defaults() {
    let config = CacheConfig::default();
    assert!(config.enabled);
    assert_eq!(config.memory_ttl, Duration::from_secs(600));
    assert_eq!(config.disk_ttl, Duration::from_secs(3600));
    assert!(CacheConfig::memory_only().directory.is_none());
    assert!(!CacheConfig::disabled().enabled);
  }
}
