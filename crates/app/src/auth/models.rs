//! Auth data models.

use jiff::Timestamp;

use crate::{
    auth::{TokenDigest, TokenPlaintext, TokenScope},
    domain::users::records::UserId,
};

/// Token persistence payload. Carries the digest only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToken {
    pub digest: TokenDigest,
    pub user_id: UserId,
    pub expires_at: Timestamp,
    pub scope: TokenScope,
}

/// Freshly issued token with its one-time plaintext.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub plaintext: TokenPlaintext,
    pub user_id: UserId,
    pub expires_at: Timestamp,
    pub scope: TokenScope,
}
