//! OpenAPI document for the served routes.

use utoipa::OpenApi;

use crate::api::handlers::auth::types::{
    RegisterRequest, ResendVerificationRequest, VerifyEmailRequest,
};
use crate::api::handlers::auth::{register, verification};
use crate::api::handlers::health;

/// Add new endpoints here so they are both served and documented; the
/// `openapi` binary prints this spec for CI.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        register::register,
        verification::verify_email,
        verification::resend_verification,
    ),
    components(schemas(RegisterRequest, VerifyEmailRequest, ResendVerificationRequest)),
    tags(
        (name = "auth", description = "Registration and email verification"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::openapi;

    #[test]
    fn openapi_documents_all_auth_routes() {
        let spec = openapi();
        let paths = &spec.paths.paths;
        assert!(paths.contains_key("/v1/auth/register"));
        assert!(paths.contains_key("/v1/auth/verify-email"));
        assert!(paths.contains_key("/v1/auth/resend-verification"));
        assert!(paths.contains_key("/health"));
    }
}
