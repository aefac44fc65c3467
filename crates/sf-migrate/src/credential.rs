//! Credential hashing for secret seed values.
//!
//! Stored form: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`, where the
//! hash is PBKDF2-HMAC-SHA256 over the plaintext with a random salt.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const SCHEME: &str = "pbkdf2-sha256";
const DEFAULT_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash `plaintext` with a fresh random salt.
pub fn hash_secret(plaintext: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    encode(plaintext, &salt, DEFAULT_ITERATIONS)
}

/// Check `plaintext` against a hash produced by [`hash_secret`].
///
/// Malformed stored values never verify.
pub fn verify_secret(plaintext: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let (Ok(iterations), Ok(salt), Ok(expected)) = (
        iterations.parse::<u32>(),
        hex::decode(salt),
        hex::decode(expected),
    ) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = derive(plaintext, &salt, iterations);
    constant_time_eq(&actual, &expected)
}

fn encode(plaintext: &str, salt: &[u8], iterations: u32) -> String {
    let hash = derive(plaintext, salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(hash)
    )
}

fn derive(plaintext: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(plaintext.as_bytes(), salt, iterations, &mut hash);
    hash
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
