//! Invitation model
//!
//! An invitation belongs to exactly one user and references one template and
//! one package. Its lifecycle is one-way: Draft -> Published, no unpublish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Invitation lifecycle state. The transition is one-way and happens at
/// most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Draft,
    Published,
}

/// A wedding invitation. Content fields stay mutable for the owner;
/// `slug` and `published_at` are immutable once set.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub package_id: Uuid,
    pub title: String,
    pub bride_name: String,
    pub groom_name: String,
    pub wedding_date: DateTime<Utc>,
    pub ceremony_time: Option<String>,
    pub ceremony_location: Option<String>,
    pub reception_time: Option<String>,
    pub reception_location: Option<String>,
    pub love_story: Option<String>,
    pub background_music_url: Option<String>,
    /// JSON array of photo URLs
    pub gallery_photos: serde_json::Value,
    /// JSON array of video URLs
    pub gallery_videos: serde_json::Value,
    pub live_stream_url: Option<String>,
    pub rsvp_enabled: bool,
    pub guest_book_enabled: bool,
    pub digital_gift_enabled: bool,
    pub qr_checkin_enabled: bool,
    pub state: LifecycleState,
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Check whether the given user owns this invitation.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Transition Draft -> Published, stamping `published_at` exactly once.
    ///
    /// # Errors
    /// - `DomainError::AlreadyPublished` if the invitation already left Draft
    pub fn publish(mut self, published_at: DateTime<Utc>) -> Result<Invitation, DomainError> {
        if self.state == LifecycleState::Published {
            return Err(DomainError::AlreadyPublished);
        }

        self.state = LifecycleState::Published;
        self.published_at = Some(published_at);
        self.updated_at = published_at;
        Ok(self)
    }
}
