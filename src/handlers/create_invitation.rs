//! Create Invitation Handler
//!
//! Verifies the owner, template, and package, resolves a unique slug, and
//! inserts the draft. The slug probe and the insert run in one transaction;
//! if a concurrent insert still wins the slug (the unique index on
//! lower(slug) rejects ours), the whole attempt retries with a fresh probe.

use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::domain::{DomainError, Invitation};
use crate::error::AppError;
use crate::slug;

use super::CreateInvitationCommand;

const MAX_SLUG_RETRIES: u32 = 3;

/// Handler for invitation creation
pub struct CreateInvitationHandler {
    catalog: CatalogStore,
    pool: PgPool,
}

impl CreateInvitationHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogStore::new(pool.clone()),
            pool,
        }
    }

    /// Execute the create command for the given owner.
    pub async fn execute(
        &self,
        user_id: Uuid,
        command: CreateInvitationCommand,
    ) -> Result<Invitation, AppError> {
        let user_known: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !user_known {
            return Err(DomainError::UserNotFound(user_id).into());
        }

        self.catalog.active_template(command.template_id).await?;
        self.catalog.active_package(command.package_id).await?;

        for attempt in 0..MAX_SLUG_RETRIES {
            match self.try_insert(user_id, &command).await {
                Ok(invitation) => {
                    tracing::info!(
                        invitation_id = %invitation.id,
                        user_id = %user_id,
                        slug = %invitation.slug,
                        "Invitation created"
                    );
                    return Ok(invitation);
                }
                Err(AppError::Database(e)) if is_unique_violation(&e) => {
                    tracing::warn!(
                        "Slug collision on insert, retrying (attempt {}/{})",
                        attempt + 1,
                        MAX_SLUG_RETRIES
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(
            "slug allocation retries exhausted".to_string(),
        ))
    }

    /// Single probe-then-insert attempt inside one transaction.
    async fn try_insert(
        &self,
        user_id: Uuid,
        command: &CreateInvitationCommand,
    ) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        let slug =
            slug::resolve_unique(&mut *tx, &command.bride_name, &command.groom_name).await?;

        let invitation: Invitation = sqlx::query_as(
            r#"
            INSERT INTO invitations (
                id, user_id, template_id, package_id, title, bride_name, groom_name,
                wedding_date, ceremony_time, ceremony_location, reception_time,
                reception_location, love_story, background_music_url, gallery_photos,
                gallery_videos, live_stream_url, rsvp_enabled, guest_book_enabled,
                digital_gift_enabled, qr_checkin_enabled, slug
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22
            )
            RETURNING id, user_id, template_id, package_id, title, bride_name, groom_name,
                      wedding_date, ceremony_time, ceremony_location, reception_time,
                      reception_location, love_story, background_music_url, gallery_photos,
                      gallery_videos, live_stream_url, rsvp_enabled, guest_book_enabled,
                      digital_gift_enabled, qr_checkin_enabled, state, slug, published_at,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(command.template_id)
        .bind(command.package_id)
        .bind(&command.title)
        .bind(&command.bride_name)
        .bind(&command.groom_name)
        .bind(command.wedding_date)
        .bind(&command.ceremony_time)
        .bind(&command.ceremony_location)
        .bind(&command.reception_time)
        .bind(&command.reception_location)
        .bind(&command.love_story)
        .bind(&command.background_music_url)
        .bind(
            command
                .gallery_photos
                .clone()
                .unwrap_or_else(|| serde_json::json!([])),
        )
        .bind(
            command
                .gallery_videos
                .clone()
                .unwrap_or_else(|| serde_json::json!([])),
        )
        .bind(&command.live_stream_url)
        .bind(command.rsvp_enabled.unwrap_or(true))
        .bind(command.guest_book_enabled.unwrap_or(true))
        .bind(command.digital_gift_enabled.unwrap_or(true))
        .bind(command.qr_checkin_enabled.unwrap_or(false))
        .bind(&slug)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(invitation)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
