//! Checksum scheme of the Robokassa gateway.
//!
//! Every signed value in the protocol is built the same way: the parts are
//! joined with `:` in a fixed order, the shared secret is appended as the
//! last part, and the whole string is hashed with MD5. MD5 is fixed by the
//! gateway's legacy protocol and is not negotiable from our side.
//!
//! Two tuples exist and must be reproduced exactly (see [`crate::gateway`]
//! and [`crate::objects::webhook`]); reordering or omitting a part yields a
//! digest the gateway treats as forged.
//!
//! Outbound digests are rendered as lowercase hex. The gateway sends its
//! own digests in either case, so verification compares case-insensitively.

use md5::{Digest, Md5};

/// Delimiter between signature parts and the trailing secret.
pub const PART_DELIMITER: char = ':';

/// Compute the hex digest over `parts` joined with `:` plus the secret.
///
/// The secret is always the last joined part. Returns lowercase hex.
pub fn sign(parts: &[&str], secret: &str) -> String {
    let mut joined = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum::<usize>() + secret.len());
    for part in parts {
        joined.push_str(part);
        joined.push(PART_DELIMITER);
    }
    joined.push_str(secret);

    let digest = Md5::digest(joined.as_bytes());
    hex::encode(digest)
}

/// Verify a candidate digest against the digest of `parts` + `secret`.
///
/// Comparison is case-insensitive; surrounding whitespace on the candidate
/// is ignored.
pub fn verify(parts: &[&str], secret: &str, candidate: &str) -> bool {
    sign(parts, secret).eq_ignore_ascii_case(candidate.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_DIGEST: &str = "e39b1eb43f9e03a2b936a50587dc276a";

    #[test]
    fn sign_is_deterministic() {
        let first = sign(&["shop1", "100.00", "12345"], "secret1");
        let second = sign(&["shop1", "100.00", "12345"], "secret1");
        assert_eq!(first, second);
        assert_eq!(first, FIXED_DIGEST);
    }

    #[test]
    fn sign_renders_lowercase_hex() {
        let digest = sign(&["shop1", "100.00", "12345"], "secret1");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn verify_accepts_any_case() {
        assert!(verify(&["shop1", "100.00", "12345"], "secret1", FIXED_DIGEST));
        assert!(verify(
            &["shop1", "100.00", "12345"],
            "secret1",
            &FIXED_DIGEST.to_uppercase()
        ));
    }

    #[test]
    fn verify_rejects_single_character_mutation() {
        // FIXED_DIGEST starts with 'e'; flip the first nibble.
        let mut mutated = FIXED_DIGEST.to_string();
        mutated.replace_range(0..1, "f");
        assert!(!verify(&["shop1", "100.00", "12345"], "secret1", &mutated));
    }

    #[test]
    fn part_order_changes_digest() {
        let ordered = sign(&["shop1", "100.00", "12345"], "secret1");
        let reordered = sign(&["100.00", "shop1", "12345"], "secret1");
        assert_ne!(ordered, reordered);
    }

    #[test]
    fn secret_is_always_last_part() {
        // sign(["a", "b"], "s") must hash "a:b:s", not "a:b" + "s".
        let explicit = sign(&["a", "b", "s"], "");
        let implicit = sign(&["a", "b"], "s");
        // "a:b:s:" vs "a:b:s" differ by the trailing delimiter.
        assert_ne!(explicit, implicit);
        assert_eq!(implicit, hex::encode(Md5::digest(b"a:b:s")));
    }
}
