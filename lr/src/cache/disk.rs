//! Persisted tier: one record file per fingerprint.
//!
//! Record layout, integers little-endian:
//!
//! ```text
//! magic "LRAT" | version u32 | written at u64 (unix seconds) | length u64
//!   | payload (JSON encoded table) | SHA-256 of payload
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use grammar::Fingerprint;
use crate::table::ActionTable;
use super::CacheError;

const MAGIC: &[u8; 4] = b"LRAT";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8 + 8;
const DIGEST_LEN: usize = 32;

pub struct DiskCache {
  directory: PathBuf,
  ttl: Duration,
}

impl DiskCache {
  pub fn new(directory: PathBuf, ttl: Duration) -> Self {
    DiskCache { directory, ttl }
  }

  pub fn path(&self, fingerprint: &Fingerprint) -> PathBuf {
    self.directory.join(format!("{}.lrat", fingerprint.to_hex()))
  }

  /// `Ok(None)` when there is no record or it has expired. Expired and
  /// corrupted records are removed.
  pub fn load(&self, fingerprint: &Fingerprint) -> Result<Option<ActionTable>, CacheError> {
    let path = self.path(fingerprint);
    let bytes = match fs::read(&path) {
      Ok(bytes) => bytes,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(err.into()),
    };

    let (written_at, table) = match decode_record(&bytes, &path) {
      Ok(record) => record,
      Err(err) => {
        remove(&path);
        return Err(err);
      }
    };

    if now_secs().saturating_sub(written_at) >= self.ttl.as_secs() {
      remove(&path);
      return Ok(None);
    }

    if table.fingerprint() != *fingerprint {
      remove(&path);
      return Err(CacheError::Corrupted {
        path,
        reason: format!("record holds the table of {}", table.fingerprint()),
      });
    }

    Ok(Some(table))
  }

  /// Publishes the record atomically. When another writer got there first,
  /// its record is kept.
  pub fn store(&self, table: &ActionTable) -> Result<(), CacheError> {
    fs::create_dir_all(&self.directory)?;
    let record = encode_record(table, now_secs())?;

    let mut file = NamedTempFile::new_in(&self.directory)?;
    file.write_all(&record)?;
    file.as_file().sync_all()?;

    match file.persist_noclobber(self.path(&table.fingerprint())) {
      Ok(_) => Ok(()),
      Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
      Err(err) => Err(err.error.into()),
    }
  }
}

fn remove(path: &Path) {
  if let Err(err) = fs::remove_file(path) {
    log::warn!("cannot remove cache record {}: {}", path.display(), err);
  }
}

fn now_secs() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or(0)
}

pub fn encode_record(table: &ActionTable, written_at: u64) -> Result<Vec<u8>, CacheError> {
  let payload = serde_json::to_vec(table)?;

  let mut record = Vec::with_capacity(HEADER_LEN + payload.len() + DIGEST_LEN);
  record.extend_from_slice(MAGIC);
  record.extend_from_slice(&VERSION.to_le_bytes());
  record.extend_from_slice(&written_at.to_le_bytes());
  record.extend_from_slice(&(payload.len() as u64).to_le_bytes());
  record.extend_from_slice(&payload);
  record.extend_from_slice(&Sha256::digest(&payload));

  Ok(record)
}

pub fn decode_record(bytes: &[u8], path: &Path) -> Result<(u64, ActionTable), CacheError> {
  let corrupted = |reason: &str| CacheError::Corrupted {
    path: path.to_owned(),
    reason: reason.to_owned(),
  };

  if bytes.len() < HEADER_LEN + DIGEST_LEN {
    return Err(corrupted("truncated header"));
  }
  if &bytes[..4] != MAGIC {
    return Err(corrupted("bad magic"));
  }

  let version = u32::from_le_bytes(le_bytes(&bytes[4..8]));
  if version != VERSION {
    return Err(corrupted("unsupported version"));
  }

  let written_at = u64::from_le_bytes(le_bytes(&bytes[8..16]));
  let len = u64::from_le_bytes(le_bytes(&bytes[16..24]));
  let expected_len = (HEADER_LEN + DIGEST_LEN) as u64;
  if bytes.len() as u64 != expected_len.saturating_add(len) {
    return Err(corrupted("length mismatch"));
  }

  let payload_end = HEADER_LEN + len as usize;
  let payload = &bytes[HEADER_LEN..payload_end];
  if Sha256::digest(payload).as_slice() != &bytes[payload_end..] {
    return Err(corrupted("digest mismatch"));
  }

  let table: ActionTable = serde_json::from_slice(payload)?;
  if !table.is_well_formed() {
    return Err(corrupted("inconsistent table dimensions"));
  }

  Ok((written_at, table))
}

fn le_bytes<const N: usize>(bytes: &[u8]) -> [u8; N] {
  let mut buf = [0; N];
  buf.copy_from_slice(&bytes[..N]);
  buf
}
