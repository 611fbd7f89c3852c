//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::TopupDecision;

/// Command to create a new draft invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationCommand {
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
    pub gallery_photos: Option<serde_json::Value>,
    pub gallery_videos: Option<serde_json::Value>,
    pub live_stream_url: Option<String>,
    pub rsvp_enabled: Option<bool>,
    pub guest_book_enabled: Option<bool>,
    pub digital_gift_enabled: Option<bool>,
    pub qr_checkin_enabled: Option<bool>,
}

impl CreateInvitationCommand {
    pub fn new(
        template_id: Uuid,
        package_id: Uuid,
        title: String,
        bride_name: String,
        groom_name: String,
        wedding_date: DateTime<Utc>,
    ) -> Self {
        Self {
            template_id,
            package_id,
            title,
            bride_name,
            groom_name,
            wedding_date,
            ceremony_time: None,
            ceremony_location: None,
            reception_time: None,
            reception_location: None,
            love_story: None,
            background_music_url: None,
            gallery_photos: None,
            gallery_videos: None,
            live_stream_url: None,
            rsvp_enabled: None,
            guest_book_enabled: None,
            digital_gift_enabled: None,
            qr_checkin_enabled: None,
        }
    }
}

/// Command to update a draft or published invitation's content fields.
/// `slug` and `published_at` are not updatable through any command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInvitationCommand {
    pub title: Option<String>,
    pub bride_name: Option<String>,
    pub groom_name: Option<String>,
    pub wedding_date: Option<DateTime<Utc>>,
    pub ceremony_time: Option<String>,
    pub ceremony_location: Option<String>,
    pub reception_time: Option<String>,
    pub reception_location: Option<String>,
    pub love_story: Option<String>,
    pub background_music_url: Option<String>,
    pub gallery_photos: Option<serde_json::Value>,
    pub gallery_videos: Option<serde_json::Value>,
    pub live_stream_url: Option<String>,
    pub rsvp_enabled: Option<bool>,
    pub guest_book_enabled: Option<bool>,
    pub digital_gift_enabled: Option<bool>,
    pub qr_checkin_enabled: Option<bool>,
}

/// Command to request a wallet top-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTopupCommand {
    pub user_id: Uuid,
    /// Amount as string for precise decimal
    pub amount: String,
    pub payment_method: String,
    pub payment_proof_url: Option<String>,
}

impl RequestTopupCommand {
    pub fn new(user_id: Uuid, amount: String, payment_method: String) -> Self {
        Self {
            user_id,
            amount,
            payment_method,
            payment_proof_url: None,
        }
    }

    pub fn with_proof_url(mut self, url: String) -> Self {
        self.payment_proof_url = Some(url);
        self
    }
}

/// Command to process (approve or reject) a pending top-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTopupCommand {
    pub admin_id: Uuid,
    pub request_id: Uuid,
    pub decision: TopupDecision,
    pub admin_notes: Option<String>,
}

impl ProcessTopupCommand {
    pub fn new(admin_id: Uuid, request_id: Uuid, decision: TopupDecision) -> Self {
        Self {
            admin_id,
            request_id,
            decision,
            admin_notes: None,
        }
    }

    pub fn with_notes(mut self, notes: String) -> Self {
        self.admin_notes = Some(notes);
        self
    }
}

/// Command to publish a draft invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishInvitationCommand {
    pub user_id: Uuid,
    pub invitation_id: Uuid,
}

impl PublishInvitationCommand {
    pub fn new(user_id: Uuid, invitation_id: Uuid) -> Self {
        Self {
            user_id,
            invitation_id,
        }
    }
}
