//! Request/response types for registration and verification endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration payload.
///
/// `derived_key` carries the client-side derived credential in place of a
/// password; `salt` is the per-registration salt that produced it and is
/// required at the schema level. A request without it never reaches storage.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub derived_key: String,
    pub salt: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use serde_json::json;

    #[test]
    fn register_request_round_trips() -> Result<()> {
        let request = RegisterRequest {
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            derived_key: "a2V5".to_string(),
            salt: "c2FsdA==".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "alice@example.com");
        let decoded: RegisterRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.salt, "c2FsdA==");
        Ok(())
    }

    #[test]
    fn register_request_requires_the_salt_field() {
        let value = json!({
            "email": "alice@example.com",
            "name": "Alice",
            "derived_key": "a2V5",
        });
        assert!(serde_json::from_value::<RegisterRequest>(value).is_err());
    }

    #[test]
    fn register_request_requires_the_derived_key_field() {
        let value = json!({
            "email": "alice@example.com",
            "name": "Alice",
            "salt": "c2FsdA==",
        });
        assert!(serde_json::from_value::<RegisterRequest>(value).is_err());
    }

    #[test]
    fn resend_verification_request_round_trips() -> Result<()> {
        let request = ResendVerificationRequest {
            email: "bob@example.com".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let decoded: ResendVerificationRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.email, "bob@example.com");
        Ok(())
    }
}
