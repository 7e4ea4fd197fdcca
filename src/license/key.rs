//! License key generation and validation.

use crate::LeasegateError;
use rand::Rng;

/// Characters used in generated keys (no `I`, `O`, `0` or `1`).
pub const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters per group.
pub const KEY_SEGMENT_LENGTH: usize = 4;

/// Groups per key.
pub const KEY_SEGMENTS: usize = 3;

/// Longest accepted caller-supplied key.
pub const MAX_KEY_LENGTH: usize = 64;

/// Generate a candidate key such as `ABCD-EFGH-JKLM`.
///
/// Uniqueness is not checked here; the store rejects collisions on insert.
pub fn generate_key() -> String {
    let mut rng = rand::thread_rng();
    let mut key = String::with_capacity(KEY_SEGMENTS * (KEY_SEGMENT_LENGTH + 1));

    for segment in 0..KEY_SEGMENTS {
        if segment > 0 {
            key.push('-');
        }
        for _ in 0..KEY_SEGMENT_LENGTH {
            let idx = rng.gen_range(0..KEY_ALPHABET.len());
            key.push(char::from(KEY_ALPHABET[idx]));
        }
    }

    key
}

/// Trim and check a caller-supplied key.
///
/// Accepted keys are non-empty, at most [`MAX_KEY_LENGTH`] characters, and
/// consist of ASCII letters, digits, `-` and `_`, so they can travel in URL
/// path segments unescaped.
pub fn normalize_key(raw: &str) -> Result<String, LeasegateError> {
    let key = raw.trim();

    if key.is_empty() {
        return Err(LeasegateError::InvalidKey(
            "key must be non-empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(LeasegateError::InvalidKey(format!(
            "key must be at most {} characters",
            MAX_KEY_LENGTH
        )));
    }
    if let Some(bad) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(LeasegateError::InvalidKey(format!(
            "key contains unsupported character {:?}",
            bad
        )));
    }

    Ok(key.to_string())
}
