//! Reference identifiers for quotes and bookings.
//!
//! References are 8 characters drawn uniformly from `A-Z0-9` (36^8 ≈ 2.8e12
//! values). Uniqueness is not guaranteed by construction: the record store
//! rejects a duplicate key and callers retry with a new reference, up to
//! [`MAX_ATTEMPTS`] times.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Reference length in characters.
pub const REFERENCE_LEN: usize = 8;

/// How many fresh references a caller tries before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{8}$").expect("static regex"));

/// Generate a new random reference.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERENCE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Normalize customer input into a reference, if it looks like one.
///
/// Surrounding whitespace and a leading `#` are ignored; letters are
/// upper-cased.
pub fn normalize(input: &str) -> Option<String> {
    let candidate = input.trim().trim_start_matches('#').trim().to_ascii_uppercase();
    REFERENCE_PATTERN.is_match(&candidate).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_references_match_format() {
        for _ in 0..200 {
            let id = generate();
            assert_eq!(id.len(), REFERENCE_LEN);
            assert!(
                id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "bad reference {id}"
            );
            assert_eq!(normalize(&id).as_deref(), Some(id.as_str()));
        }
    }

    #[test]
    fn generated_references_vary() {
        let ids: HashSet<String> = (0..50).map(|_| generate()).collect();
        assert!(ids.len() > 45);
    }

    #[test]
    fn normalize_accepts_loose_input() {
        assert_eq!(normalize("  ab12cd34 ").as_deref(), Some("AB12CD34"));
        assert_eq!(normalize("#QX9Z0PLM").as_deref(), Some("QX9Z0PLM"));
    }

    #[test]
    fn normalize_rejects_wrong_shape() {
        assert_eq!(normalize("AB12CD3"), None);
        assert_eq!(normalize("AB12CD345"), None);
        assert_eq!(normalize("AB12-D34"), None);
        assert_eq!(normalize(""), None);
    }
}
