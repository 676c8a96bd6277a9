use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::api::notify::{LogNotifier, VerificationNotifier};
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use std::sync::Arc;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            frontend_base_url,
            email_token_ttl_seconds,
            resend_cooldown_seconds,
        } => {
            // Fail early on a malformed DSN instead of inside the pool.
            let dsn = Url::parse(&dsn).context("Invalid database DSN")?;

            let config = AuthConfig::new(frontend_base_url)
                .with_email_token_ttl_seconds(email_token_ttl_seconds)
                .with_resend_cooldown_seconds(resend_cooldown_seconds);

            let notifier: Arc<dyn VerificationNotifier> = Arc::new(LogNotifier);

            api::new(port, dsn.to_string(), config, notifier).await?;
        }
    }

    Ok(())
}
