//! # Keygate
//!
//! `keygate` registers end users for a web application without ever shipping
//! their password over the wire. The browser-side flow derives a fixed-length
//! credential from the password before submission; the service stores that
//! derived key together with the salt that produced it and gates account
//! activation behind an email verification token.
//!
//! ## Credential derivation
//!
//! Registration derives a key with PBKDF2-HMAC over `email:password` and a
//! fresh 16-byte random salt per attempt. The salt is mandatory at account
//! creation; a registration request without it is rejected before anything is
//! persisted. Two registrations with identical input never produce comparable
//! stored credentials because salts are never reused.
//!
//! ## Email verification
//!
//! Accounts start as `pending_verification`. Signup issues a single-use,
//! time-bounded token; only its SHA-256 hash is stored. Presenting the token
//! once activates the account and consumes the token. Wrong, expired, and
//! already-consumed tokens are indistinguishable to the caller.

pub mod api;
pub mod cli;
pub mod client;
pub mod kdf;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent() {
        assert!(APP_USER_AGENT.starts_with("keygate/"));
    }
}
