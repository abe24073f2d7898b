//! Opaque bearer token generation, shape validation, and digesting.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

use crate::validator::Validator;

/// Random bytes behind every token.
pub const TOKEN_ENTROPY_BYTES: usize = 16;

/// Length of an encoded token plaintext: 16 bytes of base32 without padding.
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

/// Size of the persisted SHA-256 digest.
pub const TOKEN_DIGEST_BYTES: usize = 32;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// What a token may be redeemed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    Activation,
    Authentication,
}

impl TokenScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown token scope")]
pub struct UnknownScope;

impl FromStr for TokenScope {
    type Err = UnknownScope;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "activation" => Ok(Self::Activation),
            "authentication" => Ok(Self::Authentication),
            _ => Err(UnknownScope),
        }
    }
}

/// Token plaintext handed to its owner exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPlaintext(String);

impl TokenPlaintext {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest::of(&self.0)
    }
}

impl fmt::Debug for TokenPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPlaintext(**redacted**)")
    }
}

impl Drop for TokenPlaintext {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// One-way digest of a token plaintext. The only form that reaches storage.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; TOKEN_DIGEST_BYTES]);

impl TokenDigest {
    #[must_use]
    pub fn of(plaintext: &str) -> Self {
        Self(Sha256::digest(plaintext.as_bytes()).into())
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; TOKEN_DIGEST_BYTES]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TOKEN_DIGEST_BYTES] {
        &self.0
    }
}

impl fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A short prefix is enough to correlate log lines.
        let [a, b, c, d, ..] = self.0;

        write!(f, "TokenDigest({a:02x}{b:02x}{c:02x}{d:02x}..)")
    }
}

#[must_use]
pub fn generate_token_plaintext() -> TokenPlaintext {
    let mut bytes = [0_u8; TOKEN_ENTROPY_BYTES];

    OsRng.fill_bytes(&mut bytes);

    let plaintext = encode_base32(&bytes);

    bytes.zeroize();

    TokenPlaintext(plaintext)
}

/// Record shape failures for a presented token under the `token` field.
pub fn validate_token_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() == TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}

fn encode_base32(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(TOKEN_PLAINTEXT_LEN);
    let mut buffer: u16 = 0;
    let mut bits: u32 = 0;

    for byte in bytes {
        buffer = (buffer << 8) | u16::from(*byte);
        bits += 8;

        while bits >= 5 {
            bits -= 5;
            encoded.push(BASE32_ALPHABET[usize::from((buffer >> bits) & 0x1f)] as char);
        }
    }

    if bits > 0 {
        encoded.push(BASE32_ALPHABET[usize::from((buffer << (5 - bits)) & 0x1f)] as char);
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_plaintext_has_fixed_length_and_alphabet() {
        let token = generate_token_plaintext();

        assert_eq!(token.expose().len(), TOKEN_PLAINTEXT_LEN);
        assert!(
            token
                .expose()
                .bytes()
                .all(|b| BASE32_ALPHABET.contains(&b)),
            "plaintext must be base32"
        );
    }

    #[test]
    fn generated_plaintexts_differ() {
        assert_ne!(generate_token_plaintext(), generate_token_plaintext());
    }

    #[test]
    fn base32_matches_rfc4648_vectors() {
        assert_eq!(encode_base32(b"f"), "MY");
        assert_eq!(encode_base32(b"fo"), "MZXQ");
        assert_eq!(encode_base32(b"foobar"), "MZXW6YTBOI");
    }

    #[test]
    fn digest_is_deterministic_and_distinguishing() {
        assert_eq!(TokenDigest::of("abc"), TokenDigest::of("abc"));
        assert_ne!(TokenDigest::of("abc"), TokenDigest::of("abd"));
    }

    #[test]
    fn debug_output_never_contains_plaintext() {
        let token = generate_token_plaintext();

        assert!(!format!("{token:?}").contains(token.expose()));
    }

    #[test]
    fn validation_rejects_wrong_lengths() {
        let mut v = Validator::new();
        validate_token_plaintext(&mut v, "short");
        assert!(!v.is_valid());

        let mut v = Validator::new();
        validate_token_plaintext(&mut v, "");
        assert_eq!(
            v.errors().get("token").map(String::as_str),
            Some("must be provided")
        );

        let mut v = Validator::new();
        validate_token_plaintext(&mut v, generate_token_plaintext().expose());
        assert!(v.is_valid());
    }

    #[test]
    fn scope_round_trips_through_strings() {
        for scope in [TokenScope::Activation, TokenScope::Authentication] {
            assert_eq!(scope.as_str().parse::<TokenScope>().ok(), Some(scope));
        }

        assert!("refresh".parse::<TokenScope>().is_err());
    }
}
