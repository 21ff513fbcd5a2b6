//! 64-bit SimHash over whitespace-tokenized text.
//!
//! Two snippets are near-duplicates iff the Hamming distance between their
//! hashes is at or below the caller's threshold. Feature hashes come from
//! the standard SipHash-backed `DefaultHasher`; only relative distances
//! matter, so the concrete hash function is an implementation detail.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn feature_hash(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

/// SimHash of an iterator of tokens. An empty token stream hashes to 0.
pub fn simhash<'a>(tokens: impl IntoIterator<Item = &'a str>) -> u64 {
    let mut weights = [0i32; 64];
    for token in tokens {
        let h = feature_hash(token);
        for (bit, weight) in weights.iter_mut().enumerate() {
            if (h >> bit) & 1 == 1 {
                *weight += 1;
            } else {
                *weight -= 1;
            }
        }
    }

    let mut out = 0u64;
    for (bit, weight) in weights.iter().enumerate() {
        if *weight > 0 {
            out |= 1 << bit;
        }
    }
    out
}

/// SimHash of a text's whitespace tokens.
pub fn simhash_text(text: &str) -> u64 {
    simhash(text.split_whitespace())
}

/// Number of differing bits between two hashes.
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_token_sets_hash_identically() {
        let a = simhash_text("rust async web search pipeline");
        let b = simhash_text("rust  async\tweb   search pipeline");
        assert_eq!(a, b);
        assert_eq!(hamming(a, b), 0);
    }

    #[test]
    fn token_order_does_not_matter() {
        let a = simhash_text("alpha beta gamma delta");
        let b = simhash_text("delta gamma beta alpha");
        assert_eq!(a, b);
    }

    #[test]
    fn near_duplicates_are_close() {
        let a = simhash_text(
            "the quick brown fox jumps over the lazy dog near the river bank today",
        );
        let b = simhash_text(
            "the quick brown fox jumps over the lazy dog near the river bank now",
        );
        assert!(hamming(a, b) <= 20, "distance {}", hamming(a, b));
    }

    #[test]
    fn unrelated_texts_are_farther_than_near_duplicates() {
        let base = "the quick brown fox jumps over the lazy dog near the river bank today";
        let near = "the quick brown fox jumps over the lazy dog near the river bank now";
        let far = "quarterly consolidated earnings report for the global semiconductor \
                   industry beat every analyst expectation this fiscal season";
        let near_dist = hamming(simhash_text(base), simhash_text(near));
        let far_dist = hamming(simhash_text(base), simhash_text(far));
        assert!(far_dist > near_dist, "near {near_dist}, far {far_dist}");
        assert_ne!(simhash_text(base), simhash_text(far));
    }

    #[test]
    fn empty_text_hashes_to_zero() {
        assert_eq!(simhash_text(""), 0);
        assert_eq!(simhash_text("   "), 0);
    }
}
