//! Hash-based ID generation for dependency edges and scenarios.
//!
//! Ids are `{prefix}-{hash}` where the hash is a base36 encoding of a
//! SHA256 digest over the record's content, a timestamp and a nonce
//! (e.g. `dep-k3f9`). Length grows with the number of ids already issued
//! so collisions stay rare.
//!
//! ```
//! use trellis::id_generation::IdGenerator;
//!
//! let mut ids = IdGenerator::new("dep");
//! let id = ids.generate(&["alpha", "beta", "BLOCKING"]).unwrap();
//! assert!(id.starts_with("dep-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_LENGTH: usize = 8;

/// Prefix for generated dependency edge ids.
pub const EDGE_PREFIX: &str = "dep";

/// Prefix for generated scenario ids.
pub const SCENARIO_PREFIX: &str = "scn";

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce at every permitted length collided
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Nonces tried per length
        attempts: u32,
    },
}

/// Collision-checked generator of short hash ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator with no known ids.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Number of ids known to the generator.
    pub fn len(&self) -> usize {
        self.existing_ids.len()
    }

    /// Whether no ids are known yet.
    pub fn is_empty(&self) -> bool {
        self.existing_ids.is_empty()
    }

    /// Generate a new unique ID from the given content parts.
    ///
    /// # Errors
    ///
    /// Returns an error if every nonce collides at every length up to 8.
    pub fn generate(&mut self, parts: &[&str]) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        for length in self.adaptive_length()..=MAX_LENGTH {
            for nonce in 0..MAX_NONCE {
                let id = self.hash_id(parts, timestamp, nonce, length);
                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique ID after collision retries");
                    }
                    return Ok(id);
                }
            }
            warn!(
                length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, growing ID length"
            );
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    fn hash_id(&self, parts: &[&str], timestamp: i64, nonce: u32, length: usize) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"|");
        }
        hasher.update(timestamp.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();

        format!("{}-{}", self.prefix, encode_base36(&digest[..8], length))
    }

    /// 4 chars up to 500 ids, 5 up to 1,500, 6 beyond.
    fn adaptive_length(&self) -> usize {
        match self.existing_ids.len() {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }
}

/// Encode the first 8 bytes of a digest as a fixed-length base36 string.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n = bytes.iter().fold(0u64, |acc, &byte| {
        acc.wrapping_shl(8).wrapping_add(u64::from(byte))
    });

    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        out.push(BASE36_CHARS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_prefix_and_length() {
        let mut generator = IdGenerator::new(EDGE_PREFIX);
        let id = generator.generate(&["a", "b"]).unwrap();

        assert!(id.starts_with("dep-"));
        assert_eq!(id.len(), "dep-".len() + 4);
        assert!(id[4..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_same_content_yields_distinct_ids() {
        let mut generator = IdGenerator::new(SCENARIO_PREFIX);
        let ids: HashSet<String> = (0..50)
            .map(|_| generator.generate(&["same"]).unwrap())
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(generator.len(), 50);
    }

    #[test]
    fn test_registered_ids_are_avoided() {
        let mut generator = IdGenerator::new("dep");
        generator.register_id("dep-0000");
        assert!(!generator.is_empty());
        let id = generator.generate(&["x"]).unwrap();
        assert_ne!(id, "dep-0000");
    }

    #[test]
    fn test_encode_base36_pads_to_length() {
        assert_eq!(encode_base36(&[0; 8], 4), "0000");
        assert_eq!(encode_base36(&[0, 0, 0, 0, 0, 0, 0, 36], 3), "010");
    }
}
