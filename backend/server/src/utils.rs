use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const REFERENCE_PREFIX: char = '#';
pub const REFERENCE_LENGTH: usize = 5;

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// `#` followed by five characters drawn uniformly from `A-Z0-9`.
pub fn generate_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut reference = String::with_capacity(REFERENCE_LENGTH + 1);
    reference.push(REFERENCE_PREFIX);

    for _ in 0..REFERENCE_LENGTH {
        let index = rng.gen_range(0..REFERENCE_CHARSET.len());
        reference.push(REFERENCE_CHARSET[index] as char);
    }

    reference
}

/// Confirmation page path, `#` percent-encoded so it survives as a path segment.
pub fn success_path(reference: &str) -> String {
    match reference.strip_prefix(REFERENCE_PREFIX) {
        Some(code) => format!("/success/%23{code}"),
        None => format!("/success/{reference}"),
    }
}

/// Compares SHA-256 digests in constant time, so neither content nor length
/// of the expected key leaks through timing.
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided.ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_reference_shape() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let reference = generate_reference(&mut rng);

            assert_eq!(reference.len(), 6);
            assert!(reference.starts_with('#'));
            assert!(
                reference[1..]
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_reference_uses_whole_charset() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..2000 {
            seen.extend(generate_reference(&mut rng)[1..].chars());
        }

        assert_eq!(seen.len(), 36);
    }

    #[test]
    fn test_success_path() {
        assert_eq!(success_path("#A1B2C"), "/success/%23A1B2C");
        assert_eq!(success_path("A1B2C"), "/success/A1B2C");
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match("admin_secret_123", "admin_secret_123"));
        assert!(!keys_match("admin_secret_12", "admin_secret_123"));
        assert!(!keys_match("", "admin_secret_123"));
        assert!(!keys_match("ADMIN_SECRET_123", "admin_secret_123"));
    }
}
