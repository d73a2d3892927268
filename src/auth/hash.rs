//! Shared-secret hash verification.
//!
//! The expected hash is `SHA256(identity ++ secret ++ timestamp)` rendered as
//! lowercase hex, where `timestamp` is the base-10 ASCII form of the declared
//! epoch milliseconds. Clients must reproduce this exact byte sequence; the
//! comparison does no case folding or trimming.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::credentials::Credentials;
use super::payload::HashClaim;

/// Compute the lowercase hex hash a client is expected to present.
pub fn expected_hash(identity: &str, secret: &str, timestamp_millis: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.update(timestamp_millis.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Check the presented hash against the one recomputed from `credentials`.
pub fn verify(claim: &HashClaim, credentials: &Credentials) -> bool {
    let expected = expected_hash(
        &credentials.identity,
        &credentials.secret,
        claim.timestamp_millis,
    );
    constant_time_eq(&expected, &claim.presented_hash)
}

/// Byte-exact comparison that does not short-circuit on the first difference.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const STEVEN_HASH: &str = "dd463af299746906df9bd1c0ec1dc988ae2faa52be1200be10fb246766f04ba0";

    fn claim(hash: &str, timestamp_millis: i64) -> HashClaim {
        HashClaim {
            identity: "steven".to_string(),
            timestamp_millis,
            presented_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_expected_hash_known_vector() {
        assert_eq!(expected_hash("steven", "pass", 123456743), STEVEN_HASH);
        assert_eq!(
            expected_hash("steven", "pass", 1600344748887),
            "eb331232a4a80dded627002b63f2442bbc564d65c03a90e951cda1b8d4568846"
        );
    }

    #[test]
    fn test_expected_hash_is_lowercase_hex() {
        let hash = expected_hash("a", "b", -1);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_verify_valid() {
        let creds = Credentials::new("steven", "pass");
        assert!(verify(&claim(STEVEN_HASH, 123456743), &creds));
    }

    #[test]
    fn test_verify_wrong_hash() {
        let creds = Credentials::new("steven", "pass");
        assert!(!verify(&claim("12345", 123456743), &creds));
        assert!(!verify(&claim("verybadhashfromspace", 123456743), &creds));
    }

    #[test]
    fn test_verify_wrong_secret_or_time() {
        assert!(!verify(
            &claim(STEVEN_HASH, 123456743),
            &Credentials::new("steven", "Pass")
        ));
        assert!(!verify(
            &claim(STEVEN_HASH, 123456744),
            &Credentials::new("steven", "pass")
        ));
    }

    #[test]
    fn test_verify_rejects_every_single_byte_mutation() {
        let creds = Credentials::new("steven", "pass");
        let original = STEVEN_HASH.as_bytes();

        for index in 0..original.len() {
            let mut mutated = original.to_vec();
            mutated[index] = if mutated[index] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(!verify(&claim(&mutated, 123456743), &creds), "index {index}");
        }
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let creds = Credentials::new("steven", "pass");
        let upper = STEVEN_HASH.to_uppercase();
        assert!(!verify(&claim(&upper, 123456743), &creds));
    }

    #[test]
    fn test_constant_time_eq_different_lengths() {
        assert!(!constant_time_eq("short", "much-longer-string"));
        assert!(constant_time_eq("same", "same"));
    }
}
