//! Verification email dispatch abstraction.
//!
//! Registration and resend flows hand a [`VerificationMessage`] to a
//! [`VerificationNotifier`]. The notifier decides how to deliver (SMTP, API,
//! etc.) and returns `Ok`/`Err`. A failed dispatch on signup is surfaced to
//! the caller as a service error; the account stays `pending_verification` so
//! a later resend can recover.
//!
//! The default notifier for local dev is [`LogNotifier`], which logs and
//! returns `Ok(())`.

use anyhow::Result;
use tracing::info;

/// One verification email: recipient, display name, and the token both raw
/// and embedded in the frontend link.
#[derive(Clone, Debug)]
pub struct VerificationMessage {
    pub to_email: String,
    pub name: String,
    pub token: String,
    pub verify_url: String,
}

/// Email delivery abstraction invoked exactly once per issued token.
pub trait VerificationNotifier: Send + Sync {
    /// Deliver a message or return an error to mark the dispatch as failed.
    fn send(&self, message: &VerificationMessage) -> Result<()>;
}

/// Local dev notifier that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogNotifier;

impl VerificationNotifier for LogNotifier {
    fn send(&self, message: &VerificationMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            name = %message.name,
            verify_url = %message.verify_url,
            "verification email send stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_accepts_messages() {
        let message = VerificationMessage {
            to_email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            token: "token".to_string(),
            verify_url: "https://keygate.dev/verify-email#token=token".to_string(),
        };
        assert!(LogNotifier.send(&message).is_ok());
    }
}
