//! Small helpers for auth validation and email verification token handling.

use anyhow::{anyhow, Result};
use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::kdf::{DEFAULT_KEY_LENGTH, SALT_LENGTH};

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// A derived key must be base64 text decoding to the fixed key length.
pub(super) fn valid_derived_key(derived_key: &str) -> bool {
    Base64::decode_vec(derived_key).is_ok_and(|bytes| bytes.len() == DEFAULT_KEY_LENGTH)
}

/// A salt must be base64 text decoding to the fixed salt length.
pub(super) fn valid_salt(salt: &str) -> bool {
    Base64::decode_vec(salt).is_ok_and(|bytes| bytes.len() == SALT_LENGTH)
}

/// Create a new verification token for email links.
///
/// Returned token is only sent to the user; we store a hash in the database.
pub(super) fn generate_verification_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| anyhow!("failed to generate verification token: {err}"))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a verification token so we never store the raw token in the database.
pub(super) fn hash_verification_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Build the frontend verification link included in outbound emails.
pub(super) fn build_verify_url(frontend_base_url: &str, token: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!("{base}/verify-email#token={token}")
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Extract a client IP for rate limiting from common proxy headers.
pub(super) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
