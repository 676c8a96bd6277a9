//! Client-side credential derivation.
//!
//! The password never leaves the registration flow in raw form. Before any
//! network call the submitter derives a fixed-length key with PBKDF2-HMAC over
//! `email:password` and a fresh random salt, then transmits only the derived
//! key and the salt. Binding the email into the input means two accounts that
//! share a password never share a derivable key, even before salting.
//!
//! The salt is generated here on every call; callers cannot supply one. Its
//! base64 text form is both the transport encoding and the PBKDF2 salt input,
//! so the server can re-derive at login directly from the stored text.

use base64ct::{Base64, Encoding};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Sha256, Sha512};
use std::str::FromStr;
use thiserror::Error;

/// Salt length in bytes before encoding.
pub const SALT_LENGTH: usize = 16;
/// PBKDF2 iteration count used when callers do not override it.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
/// Derived key length in bytes before encoding.
pub const DEFAULT_KEY_LENGTH: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    #[error("iteration count must be greater than zero")]
    ZeroIterations,
    #[error("key length must be greater than zero")]
    ZeroKeyLength,
    #[error("unsupported digest: {0}")]
    UnsupportedDigest(String),
    #[error("failed to generate salt")]
    Salt,
    #[error("derivation worker failed")]
    Worker,
}

/// PRF digest for PBKDF2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Digest {
    #[default]
    Sha256,
    Sha512,
}

impl FromStr for Digest {
    type Err = DeriveError;

    fn from_str(digest: &str) -> Result<Self, Self::Err> {
        match digest.to_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(DeriveError::UnsupportedDigest(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeriveOptions {
    iterations: u32,
    key_length: usize,
    digest: Digest,
}

impl DeriveOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            key_length: DEFAULT_KEY_LENGTH,
            digest: Digest::Sha256,
        }
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = key_length;
        self
    }

    #[must_use]
    pub fn with_digest(mut self, digest: Digest) -> Self {
        self.digest = digest;
        self
    }

    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[must_use]
    pub fn key_length(&self) -> usize {
        self.key_length
    }

    #[must_use]
    pub fn digest(&self) -> Digest {
        self.digest
    }

    fn validate(&self) -> Result<(), DeriveError> {
        if self.iterations == 0 {
            return Err(DeriveError::ZeroIterations);
        }
        if self.key_length == 0 {
            return Err(DeriveError::ZeroKeyLength);
        }
        Ok(())
    }
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived key and the salt that produced it, both base64 text.
///
/// The key is the only value ever transmitted or stored in place of the
/// password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedCredential {
    pub key: String,
    pub salt: String,
}

/// Derive a credential for registration with a fresh random salt.
///
/// Runs on a blocking worker thread so the iterated PRF does not stall the
/// async runtime; the caller suspends until the full key is available.
///
/// # Errors
///
/// Returns [`DeriveError`] on invalid options or salt generation failure. The
/// caller must not proceed to submission when this fails.
pub async fn derive(
    email: &str,
    password: &SecretString,
    options: &DeriveOptions,
) -> Result<DerivedCredential, DeriveError> {
    options.validate()?;

    let salt = generate_salt()?;
    let input = format!("{email}:{}", password.expose_secret());
    let options = *options;

    let handle = tokio::task::spawn_blocking(move || {
        let key = derive_raw(&input, &salt, &options);
        DerivedCredential {
            key: Base64::encode_string(&key),
            salt,
        }
    });

    handle.await.map_err(|_| DeriveError::Worker)
}

/// Deterministic re-derivation from a stored salt.
///
/// Used at login time to reproduce the key for a known `(email, password,
/// salt)` triple. Registration never calls this; it always derives with a
/// fresh salt via [`derive`].
///
/// # Errors
///
/// Returns [`DeriveError`] on invalid options.
pub fn derive_key(
    email: &str,
    password: &str,
    salt: &str,
    options: &DeriveOptions,
) -> Result<Vec<u8>, DeriveError> {
    options.validate()?;
    let input = format!("{email}:{password}");
    Ok(derive_raw(&input, salt, options))
}

fn derive_raw(input: &str, salt: &str, options: &DeriveOptions) -> Vec<u8> {
    let mut key = vec![0u8; options.key_length()];
    // The salt text (not its decoded bytes) feeds the PRF, matching the
    // stored transport form.
    match options.digest() {
        Digest::Sha256 => pbkdf2_hmac::<Sha256>(
            input.as_bytes(),
            salt.as_bytes(),
            options.iterations(),
            &mut key,
        ),
        Digest::Sha512 => pbkdf2_hmac::<Sha512>(
            input.as_bytes(),
            salt.as_bytes(),
            options.iterations(),
            &mut key,
        ),
    }
    key
}

fn generate_salt() -> Result<String, DeriveError> {
    let mut bytes = [0u8; SALT_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| DeriveError::Salt)?;
    Ok(Base64::encode_string(&bytes))
}
