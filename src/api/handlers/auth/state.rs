//! Auth configuration and shared handler state.

use std::sync::Arc;

use crate::api::notify::VerificationNotifier;

use super::rate_limit::RateLimiter;

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 60;
const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Explicit configuration injected at construction; handlers never read the
/// process environment.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    email_token_ttl_seconds: i64,
    resend_cooldown_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            email_token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
        }
    }

    #[must_use]
    pub fn with_email_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.email_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_resend_cooldown_seconds(mut self, seconds: i64) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn email_token_ttl_seconds(&self) -> i64 {
        self.email_token_ttl_seconds
    }

    pub(super) fn resend_cooldown_seconds(&self) -> i64 {
        self.resend_cooldown_seconds
    }
}

pub struct AuthState {
    config: AuthConfig,
    notifier: Arc<dyn VerificationNotifier>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        notifier: Arc<dyn VerificationNotifier>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            config,
            notifier,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn notifier(&self) -> &dyn VerificationNotifier {
        self.notifier.as_ref()
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}
