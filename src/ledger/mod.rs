//! Wallet Ledger
//!
//! Owns every user's wallet balance. `users.wallet_balance` is written here
//! and nowhere else; other modules compose the in-transaction primitives so
//! their balance effect commits or rolls back with the rest of their work.
//!
//! Concurrency: each mutation locks the user row (`SELECT ... FOR UPDATE`)
//! inside its enclosing transaction, so concurrent operations on the same
//! user serialize and a partially applied balance is never observable.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Balance, DomainError, Money};
use crate::error::AppError;

/// The single mutation path for wallet balances.
#[derive(Debug, Clone)]
pub struct WalletLedger {
    pool: PgPool,
}

impl WalletLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read a user's current balance.
    pub async fn balance_of(&self, user_id: Uuid) -> Result<Balance, AppError> {
        let value: Option<Decimal> =
            sqlx::query_scalar("SELECT wallet_balance FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let value = value.ok_or(DomainError::UserNotFound(user_id))?;
        Balance::new(value).map_err(|e| AppError::Internal(format!("stored balance invalid: {e}")))
    }

    /// Credit a user's wallet. Returns the resulting balance.
    pub async fn credit(&self, user_id: Uuid, amount: Money) -> Result<Balance, AppError> {
        let mut tx = self.pool.begin().await?;
        let balance = credit_in_tx(&mut tx, user_id, amount).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Debit a user's wallet. Fails with `InsufficientBalance` when the
    /// amount exceeds the balance; never applies a partial debit.
    pub async fn debit(&self, user_id: Uuid, amount: Money) -> Result<Balance, AppError> {
        let mut tx = self.pool.begin().await?;
        let balance = debit_in_tx(&mut tx, user_id, amount).await?;
        tx.commit().await?;
        Ok(balance)
    }
}

/// Lock the user row and return its balance. Caller holds the lock until the
/// transaction ends.
async fn lock_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Balance, AppError> {
    let value: Option<Decimal> =
        sqlx::query_scalar("SELECT wallet_balance FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;

    let value = value.ok_or(DomainError::UserNotFound(user_id))?;
    Balance::new(value).map_err(|e| AppError::Internal(format!("stored balance invalid: {e}")))
}

async fn store_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    balance: Balance,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET wallet_balance = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(balance.value())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Credit within an existing transaction. Composed by top-up approval so the
/// credit commits atomically with the status flip.
pub(crate) async fn credit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: Money,
) -> Result<Balance, AppError> {
    let current = lock_balance(tx, user_id).await?;
    let updated = current
        .credit(&amount)
        .map_err(|e| AppError::Domain(e.into()))?;
    store_balance(tx, user_id, updated).await?;
    Ok(updated)
}

/// Debit within an existing transaction. Composed by the publication
/// transaction so the debit commits atomically with the state flip.
pub(crate) async fn debit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: Money,
) -> Result<Balance, AppError> {
    let current = lock_balance(tx, user_id).await?;

    if !current.is_sufficient_for(&amount) {
        return Err(DomainError::insufficient_balance(amount.value(), current.value()).into());
    }

    let updated = current
        .debit(&amount)
        .map_err(|e| AppError::Domain(e.into()))?;
    store_balance(tx, user_id, updated).await?;
    Ok(updated)
}
