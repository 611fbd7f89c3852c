//! Delete Invitation Handler
//!
//! Owner-only hard delete.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::error::AppError;

/// Handler for invitation deletion
pub struct DeleteInvitationHandler {
    pool: PgPool,
}

impl DeleteInvitationHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete the invitation if the caller owns it.
    pub async fn execute(&self, user_id: Uuid, invitation_id: Uuid) -> Result<(), AppError> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM invitations WHERE id = $1")
                .bind(invitation_id)
                .fetch_optional(&self.pool)
                .await?;

        let owner = owner.ok_or(DomainError::InvitationNotFound(invitation_id))?;
        if owner != user_id {
            return Err(
                DomainError::permission_denied("You can only delete your own invitations").into(),
            );
        }

        sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(invitation_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(invitation_id = %invitation_id, user_id = %user_id, "Invitation deleted");
        Ok(())
    }
}
