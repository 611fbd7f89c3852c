//! Update Invitation Handler
//!
//! Owner-only partial update of content fields. Lifecycle-irreversible
//! fields (slug, published_at) are not touchable from here.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, Invitation};
use crate::error::AppError;

use super::publish_invitation::load_invitation_for_update;
use super::UpdateInvitationCommand;

/// Handler for invitation content updates
pub struct UpdateInvitationHandler {
    pool: PgPool,
}

impl UpdateInvitationHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the update command for the given caller.
    pub async fn execute(
        &self,
        user_id: Uuid,
        invitation_id: Uuid,
        command: UpdateInvitationCommand,
    ) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut invitation = load_invitation_for_update(&mut tx, invitation_id)
            .await?
            .ok_or(DomainError::InvitationNotFound(invitation_id))?;

        if !invitation.is_owned_by(user_id) {
            return Err(
                DomainError::permission_denied("You can only update your own invitations").into(),
            );
        }

        apply(&mut invitation, command);
        invitation.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE invitations
            SET title = $2, bride_name = $3, groom_name = $4, wedding_date = $5,
                ceremony_time = $6, ceremony_location = $7, reception_time = $8,
                reception_location = $9, love_story = $10, background_music_url = $11,
                gallery_photos = $12, gallery_videos = $13, live_stream_url = $14,
                rsvp_enabled = $15, guest_book_enabled = $16, digital_gift_enabled = $17,
                qr_checkin_enabled = $18, updated_at = $19
            WHERE id = $1
            "#,
        )
        .bind(invitation.id)
        .bind(&invitation.title)
        .bind(&invitation.bride_name)
        .bind(&invitation.groom_name)
        .bind(invitation.wedding_date)
        .bind(&invitation.ceremony_time)
        .bind(&invitation.ceremony_location)
        .bind(&invitation.reception_time)
        .bind(&invitation.reception_location)
        .bind(&invitation.love_story)
        .bind(&invitation.background_music_url)
        .bind(&invitation.gallery_photos)
        .bind(&invitation.gallery_videos)
        .bind(&invitation.live_stream_url)
        .bind(invitation.rsvp_enabled)
        .bind(invitation.guest_book_enabled)
        .bind(invitation.digital_gift_enabled)
        .bind(invitation.qr_checkin_enabled)
        .bind(invitation.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(invitation)
    }
}

fn apply(invitation: &mut Invitation, command: UpdateInvitationCommand) {
    if let Some(title) = command.title {
        invitation.title = title;
    }
    if let Some(bride_name) = command.bride_name {
        invitation.bride_name = bride_name;
    }
    if let Some(groom_name) = command.groom_name {
        invitation.groom_name = groom_name;
    }
    if let Some(wedding_date) = command.wedding_date {
        invitation.wedding_date = wedding_date;
    }
    if let Some(ceremony_time) = command.ceremony_time {
        invitation.ceremony_time = Some(ceremony_time);
    }
    if let Some(ceremony_location) = command.ceremony_location {
        invitation.ceremony_location = Some(ceremony_location);
    }
    if let Some(reception_time) = command.reception_time {
        invitation.reception_time = Some(reception_time);
    }
    if let Some(reception_location) = command.reception_location {
        invitation.reception_location = Some(reception_location);
    }
    if let Some(love_story) = command.love_story {
        invitation.love_story = Some(love_story);
    }
    if let Some(background_music_url) = command.background_music_url {
        invitation.background_music_url = Some(background_music_url);
    }
    if let Some(gallery_photos) = command.gallery_photos {
        invitation.gallery_photos = gallery_photos;
    }
    if let Some(gallery_videos) = command.gallery_videos {
        invitation.gallery_videos = gallery_videos;
    }
    if let Some(live_stream_url) = command.live_stream_url {
        invitation.live_stream_url = Some(live_stream_url);
    }
    if let Some(rsvp_enabled) = command.rsvp_enabled {
        invitation.rsvp_enabled = rsvp_enabled;
    }
    if let Some(guest_book_enabled) = command.guest_book_enabled {
        invitation.guest_book_enabled = guest_book_enabled;
    }
    if let Some(digital_gift_enabled) = command.digital_gift_enabled {
        invitation.digital_gift_enabled = digital_gift_enabled;
    }
    if let Some(qr_checkin_enabled) = command.qr_checkin_enabled {
        invitation.qr_checkin_enabled = qr_checkin_enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LifecycleState;

    fn sample_invitation() -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            title: "Our Wedding".to_string(),
            bride_name: "Alice".to_string(),
            groom_name: "Bob".to_string(),
            wedding_date: now,
            ceremony_time: None,
            ceremony_location: None,
            reception_time: None,
            reception_location: None,
            love_story: None,
            background_music_url: None,
            gallery_photos: serde_json::json!([]),
            gallery_videos: serde_json::json!([]),
            live_stream_url: None,
            rsvp_enabled: true,
            guest_book_enabled: true,
            digital_gift_enabled: true,
            qr_checkin_enabled: false,
            state: LifecycleState::Draft,
            slug: "alice-bob-wedding".to_string(),
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_changes_only_provided_fields() {
        let mut invitation = sample_invitation();
        let command = UpdateInvitationCommand {
            title: Some("New Title".to_string()),
            love_story: Some("How we met".to_string()),
            qr_checkin_enabled: Some(true),
            ..Default::default()
        };

        apply(&mut invitation, command);

        assert_eq!(invitation.title, "New Title");
        assert_eq!(invitation.love_story, Some("How we met".to_string()));
        assert!(invitation.qr_checkin_enabled);
        // untouched fields keep their values
        assert_eq!(invitation.bride_name, "Alice");
        assert!(invitation.rsvp_enabled);
    }

    #[test]
    fn test_apply_never_touches_lifecycle_fields() {
        let mut invitation = sample_invitation();
        let slug_before = invitation.slug.clone();

        apply(&mut invitation, UpdateInvitationCommand::default());

        assert_eq!(invitation.slug, slug_before);
        assert_eq!(invitation.state, LifecycleState::Draft);
        assert!(invitation.published_at.is_none());
    }
}
