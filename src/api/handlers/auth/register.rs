//! Registration endpoint.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::api::notify::VerificationMessage;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{insert_user_and_verification, SignupOutcome};
use super::types::RegisterRequest;
use super::utils::{
    build_verify_url, extract_client_ip, normalize_email, valid_derived_key, valid_email,
    valid_salt,
};

/// Create a `pending_verification` account from a derived credential.
///
/// The payload carries the client-side derived key in place of a password and
/// the salt that produced it; both are mandatory and must decode to their
/// fixed lengths. One verification email is dispatched per created account —
/// if dispatch fails the account stays unverified and the failure is returned
/// to the caller.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful, verification email dispatched", body = String),
        (status = 400, description = "Invalid payload", body = String),
        (status = 409, description = "User with the specified email already exists", body = String),
        (status = 429, description = "Rate limited", body = String),
        (status = 502, description = "Verification email could not be sent", body = String)
    ),
    tag = "auth"
)]
#[instrument(skip(headers, pool, auth_state, payload))]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string());
    }

    let name = request.name.trim();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid name".to_string());
    }

    if !valid_derived_key(&request.derived_key) {
        return (StatusCode::BAD_REQUEST, "Invalid derived key".to_string());
    }

    if !valid_salt(&request.salt) {
        return (StatusCode::BAD_REQUEST, "Invalid salt".to_string());
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Register)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string());
    }
    if auth_state
        .rate_limiter()
        .check_email(&email, RateLimitAction::Register)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string());
    }

    let outcome = insert_user_and_verification(
        &pool,
        &email,
        name,
        &request.derived_key,
        &request.salt,
        auth_state.config(),
    )
    .await;

    let token = match outcome {
        Ok(SignupOutcome::Created { token }) => token,
        Ok(SignupOutcome::Conflict) => {
            error!("User already exists");
            return (StatusCode::CONFLICT, "User already exists".to_string());
        }
        Err(err) => {
            error!("Error creating user: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            );
        }
    };

    // Dispatch happens after commit: a failed email must never roll the
    // account back, only leave it pending_verification.
    let message = VerificationMessage {
        to_email: email.clone(),
        name: name.to_string(),
        verify_url: build_verify_url(auth_state.config().frontend_base_url(), &token),
        token,
    };

    match auth_state.notifier().send(&message) {
        Ok(()) => {
            debug!("verification email dispatched to {email}");
            (StatusCode::CREATED, "User created".to_string())
        }
        Err(err) => {
            error!("Error dispatching verification email: {err}");
            (
                StatusCode::BAD_GATEWAY,
                "Verification email could not be sent".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::super::state::{AuthConfig, AuthState};
    use super::register;
    use crate::api::handlers::auth::types::RegisterRequest;
    use crate::api::notify::{LogNotifier, VerificationNotifier};
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::Json;
    use base64ct::{Base64, Encoding};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("https://keygate.dev".to_string());
        let notifier: Arc<dyn VerificationNotifier> = Arc::new(LogNotifier);
        let limiter: Arc<dyn RateLimiter> = Arc::new(NoopRateLimiter);
        Arc::new(AuthState::new(config, notifier, limiter))
    }

    fn request(email: &str, derived_key: &str, salt: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            name: "Alice".to_string(),
            derived_key: derived_key.to_string(),
            salt: salt.to_string(),
        }
    }

    #[tokio::test]
    async fn register_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = register(HeaderMap::new(), Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let payload = request(
            "not-an-email",
            &Base64::encode_string(&[7u8; 32]),
            &Base64::encode_string(&[7u8; 16]),
        );
        let response = register(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(payload)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_wrong_length_key() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let payload = request(
            "alice@example.com",
            &Base64::encode_string(&[7u8; 16]),
            &Base64::encode_string(&[7u8; 16]),
        );
        let response = register(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(payload)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_wrong_length_salt() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let payload = request(
            "alice@example.com",
            &Base64::encode_string(&[7u8; 32]),
            &Base64::encode_string(&[7u8; 8]),
        );
        let response = register(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(payload)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
