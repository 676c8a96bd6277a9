//! Database helpers for accounts and verification state.
//!
//! Accounts are created as `pending_verification` together with the hash of
//! their first verification token in one transaction. Raw tokens are never
//! stored; consumption and activation also share a transaction so a consumed
//! token can never leave an account unactivated.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::state::AuthConfig;
use super::utils::{generate_verification_token, hash_verification_token, is_unique_violation};

/// Outcome when attempting to create a new user + verification record.
#[derive(Debug)]
pub(super) enum SignupOutcome {
    Created { token: String },
    Conflict,
}

/// Outcome for a resend request (callers always answer 204 either way).
#[derive(Debug)]
pub(super) enum ResendOutcome {
    Issued { name: String, token: String },
    Cooldown,
    Noop,
}

pub(super) async fn insert_user_and_verification(
    pool: &PgPool,
    email: &str,
    name: &str,
    derived_key: &str,
    salt: &str,
    config: &AuthConfig,
) -> Result<SignupOutcome> {
    // Transaction ensures the user row and its verification token stay
    // consistent even if something fails.
    let mut tx = pool.begin().await.context("begin signup transaction")?;

    let query = r"
        INSERT INTO users
            (email, name, derived_key, salt)
        VALUES ($1, $2, $3, $4)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(name)
        .bind(derived_key)
        .bind(salt)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await;

    let user_id: Uuid = match row {
        Ok(row) => row.get("id"),
        Err(err) => {
            if is_unique_violation(&err) {
                let _ = tx.rollback().await;
                return Ok(SignupOutcome::Conflict);
            }
            return Err(err).context("failed to insert user");
        }
    };

    let token = insert_verification_token(&mut tx, user_id, config).await?;

    tx.commit().await.context("commit signup transaction")?;

    Ok(SignupOutcome::Created { token })
}

pub(super) async fn insert_verification_token(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    config: &AuthConfig,
) -> Result<String> {
    // Generate a raw token for the email link and store only its hash.
    let token = generate_verification_token()?;
    let token_hash = hash_verification_token(&token);

    let query = r"
        INSERT INTO email_verification_tokens
            (user_id, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(token_hash)
        .bind(config.email_token_ttl_seconds())
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to insert email verification token")?;

    Ok(token)
}

pub(super) async fn consume_verification_token(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    token_hash: &[u8],
) -> Result<bool> {
    // Mark the token consumed if still valid; then activate the user in the same transaction.
    let query = r"
        UPDATE email_verification_tokens
        SET consumed_at = NOW()
        WHERE token_hash = $1
          AND consumed_at IS NULL
          AND expires_at > NOW()
        RETURNING user_id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to consume verification token")?;

    let Some(row) = row else {
        return Ok(false);
    };

    let user_id: Uuid = row.get("user_id");
    let query = r"
        UPDATE users
        SET email_verified_at = NOW(),
            status = 'active',
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to update user status")?;

    Ok(true)
}

pub(super) async fn lookup_email_by_token_hash(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    token_hash: &[u8],
) -> Result<Option<String>> {
    // Used for per-email rate limiting during verification.
    let query = r"
        SELECT users.email
        FROM email_verification_tokens
        JOIN users ON users.id = email_verification_tokens.user_id
        WHERE email_verification_tokens.token_hash = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to lookup email for token")?;
    Ok(row.map(|row| row.get("email")))
}

pub(super) async fn prepare_resend(
    pool: &PgPool,
    email: &str,
    config: &AuthConfig,
) -> Result<ResendOutcome> {
    // Resend is intentionally opaque: callers always get 204 to avoid account probing.
    let mut tx = pool.begin().await.context("begin resend transaction")?;

    let query = r"
        SELECT id, name, status
        FROM users
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to lookup user for resend")?;

    let Some(row) = row else {
        tx.commit().await.context("commit resend noop")?;
        return Ok(ResendOutcome::Noop);
    };

    let status: String = row.get("status");
    if status != "pending_verification" {
        tx.commit().await.context("commit resend noop")?;
        return Ok(ResendOutcome::Noop);
    }

    let user_id: Uuid = row.get("id");
    if resend_cooldown_active(&mut tx, user_id, config.resend_cooldown_seconds()).await? {
        tx.commit().await.context("commit resend cooldown")?;
        return Ok(ResendOutcome::Cooldown);
    }

    let name: String = row.get("name");
    let token = insert_verification_token(&mut tx, user_id, config).await?;
    tx.commit().await.context("commit resend issue")?;
    Ok(ResendOutcome::Issued { name, token })
}

async fn resend_cooldown_active(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    cooldown_seconds: i64,
) -> Result<bool> {
    // Cooldown prevents repeated resend requests from flooding the recipient.
    let query = r"
        SELECT 1
        FROM email_verification_tokens
        WHERE user_id = $1
          AND created_at > NOW() - ($2 * INTERVAL '1 second')
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(cooldown_seconds)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to check resend cooldown")?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::{ResendOutcome, SignupOutcome};

    #[test]
    fn signup_outcome_debug_names() {
        let created = SignupOutcome::Created {
            token: "token".to_string(),
        };
        assert!(format!("{created:?}").starts_with("Created"));
        assert_eq!(format!("{:?}", SignupOutcome::Conflict), "Conflict");
    }

    #[test]
    fn resend_outcome_debug_names() {
        let issued = ResendOutcome::Issued {
            name: "Alice".to_string(),
            token: "token".to_string(),
        };
        assert!(format!("{issued:?}").starts_with("Issued"));
        assert_eq!(format!("{:?}", ResendOutcome::Cooldown), "Cooldown");
        assert_eq!(format!("{:?}", ResendOutcome::Noop), "Noop");
    }
}
