//! Password secrets.

use std::{fmt, sync::LazyLock};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{Error as HashError, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use zeroize::{Zeroize, Zeroizing};

use crate::validator::Validator;

pub const PASSWORD_MIN_BYTES: usize = 8;
pub const PASSWORD_MAX_BYTES: usize = 72;

const SALT_BYTES: usize = 16;

/// Hash verified when there is no stored user, so unknown e-mails cost as much as
/// wrong passwords.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let mut password = Password::default();

    password.set("greenlight-unknown-user").ok()?;
    password.hash
});

/// Write-only password: a transient plaintext plus the stored Argon2id hash.
///
/// The plaintext only exists between [`Password::set`] and the value being dropped.
/// Neither half is ever printed.
#[derive(Clone, Default)]
pub struct Password {
    plaintext: Option<Zeroizing<String>>,
    hash: Option<String>,
}

impl Password {
    /// Password loaded from storage.
    #[must_use]
    pub fn from_hash(hash: String) -> Self {
        Self {
            plaintext: None,
            hash: Some(hash),
        }
    }

    /// Hash `plaintext` and keep both halves.
    ///
    /// # Errors
    ///
    /// Returns the underlying hashing error.
    pub fn set(&mut self, plaintext: &str) -> Result<(), HashError> {
        let mut salt = [0_u8; SALT_BYTES];

        OsRng.fill_bytes(&mut salt);

        let salt_string = SaltString::encode_b64(&salt);

        salt.zeroize();

        let salt_string = salt_string?;
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt_string)?
            .to_string();

        self.plaintext = Some(Zeroizing::new(plaintext.to_string()));
        self.hash = Some(hash);

        Ok(())
    }

    /// Check `plaintext` against the stored hash. A mismatch is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no hash or it cannot be parsed.
    pub fn matches(&self, plaintext: &str) -> Result<bool, HashError> {
        let hash = self.hash.as_deref().ok_or(HashError::PhcStringField)?;
        let parsed = PasswordHash::new(hash)?;

        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(error) => Err(error),
        }
    }

    #[must_use]
    pub fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref().map(String::as_str)
    }

    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }
}

/// Run a full verification of `plaintext` against a throwaway hash and discard the
/// outcome.
pub fn verify_without_user(plaintext: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _discarded = Password::from_hash(hash.to_owned()).matches(plaintext);
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

pub fn validate_password_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "password", "must be provided");
    v.check(
        plaintext.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        plaintext.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn set_password_matches_itself_only() -> TestResult {
        let mut password = Password::default();

        password.set("pa55word1234")?;

        assert!(password.matches("pa55word1234")?, "same plaintext matches");
        assert!(!password.matches("pa55word1235")?, "other plaintext does not");
        assert!(
            password.hash().is_some_and(|h| h.starts_with("$argon2id$")),
            "hash is a PHC string"
        );

        Ok(())
    }

    #[test]
    fn stored_hash_verifies_without_plaintext() -> TestResult {
        let mut original = Password::default();

        original.set("correct horse")?;

        let loaded = Password::from_hash(original.hash().unwrap_or_default().to_string());

        assert!(loaded.plaintext().is_none(), "loaded passwords carry no plaintext");
        assert!(loaded.matches("correct horse")?, "loaded hash verifies");

        Ok(())
    }

    #[test]
    fn unknown_user_verification_costs_as_much_as_a_real_one() -> TestResult {
        let mut real = Password::default();

        real.set("pa55word1234")?;

        let dummy = PasswordHash::new(DUMMY_HASH.as_deref().ok_or("dummy hash missing")?)?;
        let stored = PasswordHash::new(real.hash().ok_or("hash missing")?)?;

        assert_eq!(dummy.algorithm, stored.algorithm);
        assert_eq!(dummy.version, stored.version);
        assert_eq!(dummy.params, stored.params, "same memory, time and lanes");

        verify_without_user("pa55word1234");

        Ok(())
    }

    #[test]
    fn missing_hash_is_an_error() {
        assert!(
            Password::default().matches("anything").is_err(),
            "nothing to verify against"
        );
    }

    #[test]
    fn debug_never_prints_secrets() -> TestResult {
        let mut password = Password::default();

        password.set("pa55word1234")?;

        let printed = format!("{password:?}");

        assert!(!printed.contains("pa55word1234"), "plaintext leaked");
        assert!(!printed.contains("argon2"), "hash leaked");

        Ok(())
    }

    #[test]
    fn plaintext_length_bounds() {
        let cases = [
            ("", Some("must be provided")),
            ("short", Some("must be at least 8 bytes long")),
            ("exactly8", None),
            (&"x".repeat(72), None),
            (&"x".repeat(73), Some("must not be more than 72 bytes long")),
        ];

        for (plaintext, expected) in cases {
            let mut v = Validator::new();

            validate_password_plaintext(&mut v, plaintext);

            assert_eq!(
                v.errors().get("password").map(String::as_str),
                expected,
                "password of {} bytes",
                plaintext.len()
            );
        }
    }
}
