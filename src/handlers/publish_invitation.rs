//! Publish Invitation Handler
//!
//! Composes the wallet debit and the Draft -> Published transition as one
//! transaction. No interleaving request can observe a debited balance with
//! an unpublished invitation, or the reverse.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::catalog;
use crate::domain::{DomainError, Invitation, LifecycleState};
use crate::error::AppError;
use crate::ledger;

use super::PublishInvitationCommand;

/// Handler for the publication transaction
pub struct PublishInvitationHandler {
    pool: PgPool,
}

impl PublishInvitationHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the publish command
    pub async fn execute(&self, command: PublishInvitationCommand) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock the invitation row; concurrent publishes of the same
        // invitation serialize here.
        let invitation = load_invitation_for_update(&mut tx, command.invitation_id)
            .await?
            .ok_or(DomainError::InvitationNotFound(command.invitation_id))?;

        if !invitation.is_owned_by(command.user_id) {
            return Err(
                DomainError::permission_denied("You can only publish your own invitations").into(),
            );
        }

        if invitation.state == LifecycleState::Published {
            return Err(DomainError::AlreadyPublished.into());
        }

        // Existence only: a package retired after creation still publishes.
        let package = catalog::package_by_id(&mut *tx, invitation.package_id).await?;

        // Locks the user row, checks the balance, and applies the full
        // debit or nothing.
        let new_balance = ledger::debit_in_tx(&mut tx, command.user_id, package.price).await?;

        let published = invitation.publish(Utc::now())?;

        sqlx::query(
            r#"
            UPDATE invitations
            SET state = $2, published_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(published.id)
        .bind(published.state)
        .bind(published.published_at)
        .execute(&mut *tx)
        .await?;

        // Both mutations become visible together, or not at all.
        tx.commit().await?;

        tracing::info!(
            invitation_id = %published.id,
            user_id = %command.user_id,
            price = %package.price,
            balance = %new_balance,
            slug = %published.slug,
            "Invitation published"
        );

        Ok(published)
    }
}

/// Load an invitation with a row lock held for the rest of the transaction.
pub(crate) async fn load_invitation_for_update(
    tx: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
) -> Result<Option<Invitation>, AppError> {
    let invitation: Option<Invitation> = sqlx::query_as(
        r#"
        SELECT id, user_id, template_id, package_id, title, bride_name, groom_name,
               wedding_date, ceremony_time, ceremony_location, reception_time,
               reception_location, love_story, background_music_url, gallery_photos,
               gallery_videos, live_stream_url, rsvp_enabled, guest_book_enabled,
               digital_gift_enabled, qr_checkin_enabled, state, slug, published_at,
               created_at, updated_at
        FROM invitations
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(invitation_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(invitation)
}
