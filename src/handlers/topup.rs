//! Top-up Handler
//!
//! Creating a top-up request and processing it. Approval credits the wallet
//! in the same transaction that flips the request status, so a request can
//! never be observed approved-but-uncredited or credited twice.

use chrono::Utc;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{DomainError, Money, TopupDecision, TopupRequest};
use crate::error::AppError;
use crate::ledger;

use super::{ProcessTopupCommand, RequestTopupCommand};

/// Handler for wallet top-ups
pub struct TopupHandler {
    pool: PgPool,
}

impl TopupHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending top-up request. No balance effect until approval.
    pub async fn request(&self, command: RequestTopupCommand) -> Result<TopupRequest, AppError> {
        let amount: Money = command
            .amount
            .parse()
            .map_err(|e: crate::domain::MoneyError| AppError::Domain(e.into()))?;

        if !user_exists(&self.pool, command.user_id).await? {
            return Err(DomainError::UserNotFound(command.user_id).into());
        }

        let topup: TopupRequest = sqlx::query_as(
            r#"
            INSERT INTO wallet_topups (id, user_id, amount, payment_method, payment_proof_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, amount, payment_method, payment_proof_url,
                      status, admin_notes, processed_by, processed_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(command.user_id)
        .bind(amount.value())
        .bind(&command.payment_method)
        .bind(&command.payment_proof_url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            topup_id = %topup.id,
            user_id = %topup.user_id,
            amount = %topup.amount,
            "Top-up requested"
        );

        Ok(topup)
    }

    /// Process a pending request. On approval the status flip, the
    /// processed_by/processed_at stamp, and the wallet credit commit as a
    /// single unit; any failure rolls all of it back.
    pub async fn process(&self, command: ProcessTopupCommand) -> Result<TopupRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        if !user_exists(&mut *tx, command.admin_id).await? {
            return Err(DomainError::AdminNotFound(command.admin_id).into());
        }

        // Lock the request row; a concurrent process() of the same request
        // waits here and then fails AlreadyProcessed.
        let topup = load_topup_for_update(&mut tx, command.request_id)
            .await?
            .ok_or(DomainError::RequestNotFound(command.request_id))?;

        let processed = topup.process(
            command.decision,
            command.admin_id,
            command.admin_notes.clone(),
            Utc::now(),
        )?;

        sqlx::query(
            r#"
            UPDATE wallet_topups
            SET status = $2, admin_notes = $3, processed_by = $4, processed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(processed.id)
        .bind(processed.status)
        .bind(&processed.admin_notes)
        .bind(processed.processed_by)
        .bind(processed.processed_at)
        .execute(&mut *tx)
        .await?;

        if command.decision == TopupDecision::Approved {
            ledger::credit_in_tx(&mut tx, processed.user_id, processed.amount).await?;
        }

        tx.commit().await?;

        tracing::info!(
            topup_id = %processed.id,
            admin_id = %command.admin_id,
            decision = ?command.decision,
            "Top-up processed"
        );

        Ok(processed)
    }

    /// List top-up requests, optionally restricted to one user.
    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<TopupRequest>, AppError> {
        let topups: Vec<TopupRequest> = match user_id {
            Some(user_id) => {
                sqlx::query_as(
                    r#"
                    SELECT id, user_id, amount, payment_method, payment_proof_url,
                           status, admin_notes, processed_by, processed_at, created_at
                    FROM wallet_topups
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, user_id, amount, payment_method, payment_proof_url,
                           status, admin_notes, processed_by, processed_at, created_at
                    FROM wallet_topups
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(topups)
    }
}

async fn user_exists<'e, E>(executor: E, user_id: Uuid) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(executor)
        .await?;
    Ok(exists)
}

async fn load_topup_for_update(
    tx: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
) -> Result<Option<TopupRequest>, AppError> {
    let topup: Option<TopupRequest> = sqlx::query_as(
        r#"
        SELECT id, user_id, amount, payment_method, payment_proof_url,
               status, admin_notes, processed_by, processed_at, created_at
        FROM wallet_topups
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(request_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(topup)
}
