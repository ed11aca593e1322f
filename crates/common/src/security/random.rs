//! Random token generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Entropy of a generated OAuth nonce (256 bits, 43 base64url characters).
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Generate a URL-safe random token from the operating system CSPRNG.
///
/// The output is unpadded base64url, so it can be placed in a query string
/// without escaping.
#[must_use]
pub fn generate_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len.max(1)];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compare two secrets without short-circuiting on the first mismatch.
///
/// Length is not secret: unequal lengths return `false` immediately.
#[must_use]
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    let (left, right) = (left.as_bytes(), right.as_bytes());
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn tokens_are_url_safe_and_sized() {
        let token = generate_token(DEFAULT_TOKEN_BYTES);

        assert_eq!(token.len(), 43);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..256).map(|_| generate_token(16)).collect();
        assert_eq!(tokens.len(), 256);
    }

    #[test]
    fn constant_time_eq_matches_plain_equality() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
