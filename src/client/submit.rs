//! Submitting a validated registration to the service.

use crate::api::handlers::auth::types::RegisterRequest;
use crate::client::form::{RegistrationForm, ValidationErrors};
use crate::kdf::{self, DeriveError, DeriveOptions};
use crate::APP_USER_AGENT;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Derivation(#[from] DeriveError),
    #[error("registration rejected ({status}): {message}")]
    Service { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// UI hook points for one submission attempt.
///
/// `pending` brackets the remote call only; exactly one of `success` or
/// `error` fires per attempt.
pub trait SubmitObserver: Send + Sync {
    fn pending(&self, _pending: bool) {}
    fn success(&self) {}
    fn error(&self, _error: &SubmitError) {}
}

#[derive(Clone, Debug)]
pub struct NoopObserver;

impl SubmitObserver for NoopObserver {}

/// Client for the registration endpoint.
pub struct RegistrationClient {
    base_url: String,
    options: DeriveOptions,
    http: Client,
}

impl RegistrationClient {
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SubmitError> {
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            base_url: base_url.into(),
            options: DeriveOptions::new(),
            http,
        })
    }

    #[must_use]
    pub fn with_derive_options(mut self, options: DeriveOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one registration attempt end to end.
    ///
    /// Validation failures stop the attempt before derivation; derivation
    /// must complete before the request is built, so the cleartext password is
    /// never part of any payload. Resubmitting the same form derives a fresh
    /// salt and key every time.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] describing which stage failed; the observer is
    /// notified exactly once either way.
    #[instrument(skip(self, form, observer))]
    pub async fn submit(
        &self,
        form: &RegistrationForm,
        observer: &dyn SubmitObserver,
    ) -> Result<(), SubmitError> {
        if let Err(errors) = form.validate() {
            let error = SubmitError::Validation(errors);
            observer.error(&error);
            return Err(error);
        }

        // Normalized once so the derived key and the stored account agree on
        // the identity that was bound into the derivation input.
        let email = form.email.trim().to_lowercase();

        let credential = match kdf::derive(&email, &form.password, &self.options).await {
            Ok(credential) => credential,
            Err(err) => {
                let error = SubmitError::Derivation(err);
                observer.error(&error);
                return Err(error);
            }
        };

        let request = RegisterRequest {
            email,
            name: form.name.trim().to_string(),
            derived_key: credential.key,
            salt: credential.salt,
        };

        observer.pending(true);
        let result = self.post_register(&request).await;
        observer.pending(false);

        match result {
            Ok(()) => {
                observer.success();
                Ok(())
            }
            Err(error) => {
                observer.error(&error);
                Err(error)
            }
        }
    }

    async fn post_register(&self, request: &RegisterRequest) -> Result<(), SubmitError> {
        let url = format!("{}/v1/auth/register", self.base_url.trim_end_matches('/'));
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            debug!("registration accepted");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(SubmitError::Service { status, message })
    }
}
