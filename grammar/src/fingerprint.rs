use serde::{Serialize, Deserialize};
use sha2::{Digest, Sha256};
use std::fmt;
use crate::{Grammar, ConflictArbitration, SymbolKind};

/// Structural hash of a grammar: everything that shapes its action table,
/// and nothing that depends on how or where the grammar was built.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl fmt::Debug for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "Fingerprint({})", self.to_hex())
  }
}

impl Grammar {
  pub fn fingerprint(&self) -> Fingerprint {
    let mut h = Sha256::new();

    hash_tag(&mut h, "symbols");
    hash_usize(&mut h, self.symbols().len());
    for (_, kind, name) in self.symbols().iter() {
      hash_tag(&mut h, match kind {
        SymbolKind::Terminal => "t",
        SymbolKind::Nonterminal => "n",
      });
      hash_str(&mut h, name);
    }

    hash_tag(&mut h, "target");
    match self.target_symbol() {
      Some(sym) => hash_u32(&mut h, sym.id()),
      None => hash_tag(&mut h, "none"),
    }

    hash_tag(&mut h, "rules");
    hash_usize(&mut h, self.rules().len());
    for rule in self.rules() {
      hash_u32(&mut h, rule.id().id());
      hash_u32(&mut h, rule.target().id());
      hash_usize(&mut h, rule.clause().len());
      for sym in rule.clause() {
        hash_u32(&mut h, sym.id());
      }
      hash_u32(&mut h, rule.precedence_level());
      hash_tag(&mut h, match rule.arbitration() {
        ConflictArbitration::Shift => "shift",
        ConflictArbitration::Reduce => "reduce",
        ConflictArbitration::Fail => "fail",
      });
    }

    hash_tag(&mut h, "precedence");
    let mut levels = self.precedence_levels().iter()
      .map(|(sym, level)| (*sym, *level))
      .collect::<Vec<_>>();
    levels.sort();
    hash_usize(&mut h, levels.len());
    for (sym, level) in levels {
      hash_u32(&mut h, sym.id());
      hash_u32(&mut h, level);
    }

    Fingerprint(h.finalize().into())
  }
}

fn hash_tag(h: &mut Sha256, tag: &str) {
  h.update(tag.as_bytes());
  h.update([0]);
}

fn hash_str(h: &mut Sha256, v: &str) {
  h.update(v.len().to_string().as_bytes());
  h.update(b":");
  h.update(v.as_bytes());
  h.update([0]);
}

fn hash_usize(h: &mut Sha256, v: usize) {
  h.update(v.to_string().as_bytes());
  h.update([0]);
}

fn hash_u32(h: &mut Sha256, v: u32) {
  h.update(v.to_string().as_bytes());
  h.update([0]);
}
