//! Email verification endpoints.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::notify::VerificationMessage;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{
    consume_verification_token, lookup_email_by_token_hash, prepare_resend, ResendOutcome,
};
use super::types::{ResendVerificationRequest, VerifyEmailRequest};
use super::utils::{
    build_verify_url, extract_client_ip, hash_verification_token, normalize_email, valid_email,
};

/// Verify the email link by consuming the hashed token and activating the user.
///
/// Wrong, expired, and already-consumed tokens all answer the same generic
/// 400, so callers cannot tell whether a token ever existed.
#[utoipa::path(
    post,
    path = "/v1/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 204, description = "Email verified"),
        (status = 400, description = "Invalid/expired token", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn verify_email(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyEmailRequest>>,
) -> impl IntoResponse {
    let request: VerifyEmailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let token = request.token.trim();
    if token.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing token".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::VerifyEmail)
        == RateLimitDecision::Limited
    {
        // Rate limits are enforced before any token work to avoid amplification.
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    // Hash the token before lookup; raw tokens are never stored server-side.
    let token_hash = hash_verification_token(token);
    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            error!("Failed to start verify-email transaction: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response();
        }
    };

    if let Ok(Some(email)) = lookup_email_by_token_hash(&mut tx, &token_hash).await {
        // Email-based limits reduce repeated verification attempts for the same address.
        if auth_state
            .rate_limiter()
            .check_email(&email, RateLimitAction::VerifyEmail)
            == RateLimitDecision::Limited
        {
            let _ = tx.rollback().await;
            return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
        }
    }

    match consume_verification_token(&mut tx, &token_hash).await {
        Ok(true) => {
            if let Err(err) = tx.commit().await {
                error!("Failed to commit verify-email transaction: {err}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Verification failed".to_string(),
                )
                    .into_response();
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => {
            let _ = tx.rollback().await;
            (StatusCode::BAD_REQUEST, "Invalid token".to_string()).into_response()
        }
        Err(err) => {
            error!("Failed to verify email: {err}");
            let _ = tx.rollback().await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed".to_string(),
            )
                .into_response()
        }
    }
}

/// Resend a verification email (always returns 204 to avoid user enumeration).
#[utoipa::path(
    post,
    path = "/v1/auth/resend-verification",
    request_body = ResendVerificationRequest,
    responses(
        (status = 204, description = "Resend accepted")
    ),
    tag = "auth"
)]
pub async fn resend_verification(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResendVerificationRequest>>,
) -> impl IntoResponse {
    let request: ResendVerificationRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        // Always return 204 for invalid emails to avoid account probing.
        return StatusCode::NO_CONTENT.into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::ResendVerification)
        == RateLimitDecision::Limited
    {
        // Resend is intentionally opaque; rate limits still return 204.
        return StatusCode::NO_CONTENT.into_response();
    }
    if auth_state
        .rate_limiter()
        .check_email(&email, RateLimitAction::ResendVerification)
        == RateLimitDecision::Limited
    {
        return StatusCode::NO_CONTENT.into_response();
    }

    match prepare_resend(&pool, &email, auth_state.config()).await {
        Ok(ResendOutcome::Issued { name, token }) => {
            let message = VerificationMessage {
                to_email: email.clone(),
                name,
                verify_url: build_verify_url(auth_state.config().frontend_base_url(), &token),
                token,
            };
            if let Err(err) = auth_state.notifier().send(&message) {
                // The token row already exists; the user can request another
                // resend after the cooldown.
                error!("Failed to dispatch resend verification email: {err}");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(ResendOutcome::Cooldown | ResendOutcome::Noop) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to prepare resend verification: {err}");
            // Avoid leaking failures; always return 204 to callers.
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::super::state::{AuthConfig, AuthState};
    use super::{resend_verification, verify_email, VerifyEmailRequest};
    use crate::api::handlers::auth::types::ResendVerificationRequest;
    use crate::api::notify::{LogNotifier, VerificationNotifier};
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::Json;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("https://keygate.dev".to_string());
        let notifier: Arc<dyn VerificationNotifier> = Arc::new(LogNotifier);
        let limiter: Arc<dyn RateLimiter> = Arc::new(NoopRateLimiter);
        Arc::new(AuthState::new(config, notifier, limiter))
    }

    #[tokio::test]
    async fn verify_email_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_email(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn verify_email_empty_token() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_email(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(VerifyEmailRequest {
                token: " ".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn resend_verification_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = resend_verification(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn resend_verification_invalid_email_is_opaque() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = resend_verification(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(ResendVerificationRequest {
                email: "not-an-email".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }
}
