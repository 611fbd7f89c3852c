//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Balance, Invitation, Money, OperationContext, TopupDecision, TopupRequest, User,
};
use crate::error::AppError;
use crate::handlers::{
    CreateInvitationCommand, CreateInvitationHandler, DeleteInvitationHandler,
    ProcessTopupCommand, PublishInvitationCommand, PublishInvitationHandler, RequestTopupCommand,
    TopupHandler, UpdateInvitationCommand, UpdateInvitationHandler,
};
use crate::ledger::WalletLedger;
use crate::slug::SlugResolver;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct SlugPreviewQuery {
    pub bride_name: String,
    pub groom_name: String,
}

#[derive(Debug, Serialize)]
pub struct SlugPreviewResponse {
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub balance: Balance,
}

#[derive(Debug, Deserialize)]
pub struct TopupCreateRequest {
    pub amount: String,
    pub payment_method: String,
    #[serde(default)]
    pub payment_proof_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopupProcessRequest {
    pub decision: TopupDecision,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopupListQuery {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerMoveRequest {
    pub user_id: Uuid,
    pub amount: String,
}

// =========================================================================
// Caller helpers
// =========================================================================

fn require_caller(context: &OperationContext) -> Result<Uuid, AppError> {
    context
        .caller_id
        .ok_or_else(|| AppError::MissingHeader("X-User-Id".to_string()))
}

fn require_admin(context: &OperationContext) -> Result<Uuid, AppError> {
    let caller = require_caller(context)?;
    if !context.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }
    Ok(caller)
}

fn parse_amount(raw: &str) -> Result<Money, AppError> {
    raw.parse()
        .map_err(|e: crate::domain::MoneyError| AppError::Domain(e.into()))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Invitations
        .route("/invitations", post(create_invitation))
        .route("/invitations", get(list_invitations))
        .route("/invitations/slug-preview", get(slug_preview))
        .route("/invitations/:invitation_id", get(get_invitation))
        .route("/invitations/:invitation_id", patch(update_invitation))
        .route("/invitations/:invitation_id", delete(delete_invitation))
        .route(
            "/invitations/:invitation_id/publish",
            post(publish_invitation),
        )
        // Guest-facing lookup
        .route("/public/invitations/:slug", get(get_published_by_slug))
        // Wallet
        .route("/wallet/balance", get(get_wallet_balance))
        .route("/wallet/topups", post(request_topup))
        .route("/wallet/topups", get(list_own_topups))
        // Admin
        .route("/admin/users/:user_id", get(get_user))
        .route("/admin/topups", get(list_all_topups))
        .route("/admin/topups/:topup_id/process", post(process_topup))
        .route("/admin/ledger/credit", post(ledger_credit))
        .route("/admin/ledger/debit", post(ledger_debit))
}

// =========================================================================
// POST /invitations
// =========================================================================

/// Create a draft invitation owned by the caller
async fn create_invitation(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CreateInvitationCommand>,
) -> Result<(StatusCode, Json<Invitation>), AppError> {
    let caller = require_caller(&context)?;

    let handler = CreateInvitationHandler::new(pool);
    let invitation = handler.execute(caller, command).await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

// =========================================================================
// GET /invitations
// =========================================================================

/// List the caller's invitations
async fn list_invitations(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<Invitation>>, AppError> {
    let caller = require_caller(&context)?;

    let invitations: Vec<Invitation> = sqlx::query_as(
        r#"
        SELECT id, user_id, template_id, package_id, title, bride_name, groom_name,
               wedding_date, ceremony_time, ceremony_location, reception_time,
               reception_location, love_story, background_music_url, gallery_photos,
               gallery_videos, live_stream_url, rsvp_enabled, guest_book_enabled,
               digital_gift_enabled, qr_checkin_enabled, state, slug, published_at,
               created_at, updated_at
        FROM invitations
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(caller)
    .fetch_all(&pool)
    .await?;

    Ok(Json(invitations))
}

// =========================================================================
// GET /invitations/slug-preview
// =========================================================================

/// Preview the slug a bride/groom pair would resolve to right now.
/// Read-only; a slug is only reserved when an invitation is created.
async fn slug_preview(
    State(pool): State<PgPool>,
    Query(query): Query<SlugPreviewQuery>,
) -> Result<Json<SlugPreviewResponse>, AppError> {
    let resolver = SlugResolver::new(pool);
    let slug = resolver
        .resolve(&query.bride_name, &query.groom_name)
        .await?;
    Ok(Json(SlugPreviewResponse { slug }))
}

// =========================================================================
// GET /invitations/:invitation_id
// =========================================================================

/// Get an invitation by id
async fn get_invitation(
    State(pool): State<PgPool>,
    Path(invitation_id): Path<Uuid>,
) -> Result<Json<Invitation>, AppError> {
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
        "#,
    )
    .bind(invitation_id)
    .fetch_optional(&pool)
    .await?;

    let invitation =
        invitation.ok_or(crate::domain::DomainError::InvitationNotFound(invitation_id))?;
    Ok(Json(invitation))
}

// =========================================================================
// PATCH /invitations/:invitation_id
// =========================================================================

/// Update the caller's invitation content
async fn update_invitation(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(invitation_id): Path<Uuid>,
    Json(command): Json<UpdateInvitationCommand>,
) -> Result<Json<Invitation>, AppError> {
    let caller = require_caller(&context)?;

    let handler = UpdateInvitationHandler::new(pool);
    let invitation = handler.execute(caller, invitation_id, command).await?;

    Ok(Json(invitation))
}

// =========================================================================
// DELETE /invitations/:invitation_id
// =========================================================================

/// Delete the caller's invitation
async fn delete_invitation(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(invitation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let caller = require_caller(&context)?;

    let handler = DeleteInvitationHandler::new(pool);
    handler.execute(caller, invitation_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// POST /invitations/:invitation_id/publish
// =========================================================================

/// Publish the caller's invitation, debiting the package price
async fn publish_invitation(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(invitation_id): Path<Uuid>,
) -> Result<Json<Invitation>, AppError> {
    let caller = require_caller(&context)?;

    let handler = PublishInvitationHandler::new(pool);
    let invitation = handler
        .execute(PublishInvitationCommand::new(caller, invitation_id))
        .await?;

    Ok(Json(invitation))
}

// =========================================================================
// GET /public/invitations/:slug
// =========================================================================

/// Guest-facing lookup: published invitations only
async fn get_published_by_slug(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
) -> Result<Json<Invitation>, AppError> {
    let invitation: Option<Invitation> = sqlx::query_as(
        r#"
        SELECT id, user_id, template_id, package_id, title, bride_name, groom_name,
               wedding_date, ceremony_time, ceremony_location, reception_time,
               reception_location, love_story, background_music_url, gallery_photos,
               gallery_videos, live_stream_url, rsvp_enabled, guest_book_enabled,
               digital_gift_enabled, qr_checkin_enabled, state, slug, published_at,
               created_at, updated_at
        FROM invitations
        WHERE lower(slug) = lower($1) AND state = 'published'
        "#,
    )
    .bind(&slug)
    .fetch_optional(&pool)
    .await?;

    match invitation {
        Some(invitation) => Ok(Json(invitation)),
        None => Err(AppError::NotFound(format!(
            "No published invitation at slug '{slug}'"
        ))),
    }
}

// =========================================================================
// GET /admin/users/:user_id
// =========================================================================

/// Admin support view of a user, wallet balance included
async fn get_user(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    require_admin(&context)?;

    let user: Option<User> = sqlx::query_as(
        r#"
        SELECT id, email, name, phone, role, wallet_balance, is_active, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?;

    let user = user.ok_or(crate::domain::DomainError::UserNotFound(user_id))?;
    Ok(Json(user))
}

// =========================================================================
// GET /wallet/balance
// =========================================================================

/// Get the caller's wallet balance
async fn get_wallet_balance(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<BalanceResponse>, AppError> {
    let caller = require_caller(&context)?;

    let ledger = WalletLedger::new(pool);
    let balance = ledger.balance_of(caller).await?;

    Ok(Json(BalanceResponse {
        user_id: caller,
        balance,
    }))
}

// =========================================================================
// POST /wallet/topups
// =========================================================================

/// Request a top-up for the caller's wallet
async fn request_topup(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TopupCreateRequest>,
) -> Result<(StatusCode, Json<TopupRequest>), AppError> {
    let caller = require_caller(&context)?;

    let command = RequestTopupCommand {
        user_id: caller,
        amount: request.amount,
        payment_method: request.payment_method,
        payment_proof_url: request.payment_proof_url,
    };

    let handler = TopupHandler::new(pool);
    let topup = handler.request(command).await?;

    Ok((StatusCode::CREATED, Json(topup)))
}

// =========================================================================
// GET /wallet/topups
// =========================================================================

/// List the caller's top-up requests
async fn list_own_topups(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Vec<TopupRequest>>, AppError> {
    let caller = require_caller(&context)?;

    let handler = TopupHandler::new(pool);
    let topups = handler.list(Some(caller)).await?;

    Ok(Json(topups))
}

// =========================================================================
// GET /admin/topups
// =========================================================================

/// List all top-up requests (optionally filtered by user)
async fn list_all_topups(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<TopupListQuery>,
) -> Result<Json<Vec<TopupRequest>>, AppError> {
    require_admin(&context)?;

    let handler = TopupHandler::new(pool);
    let topups = handler.list(query.user_id).await?;

    Ok(Json(topups))
}

// =========================================================================
// POST /admin/topups/:topup_id/process
// =========================================================================

/// Approve or reject a pending top-up
async fn process_topup(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(topup_id): Path<Uuid>,
    Json(request): Json<TopupProcessRequest>,
) -> Result<Json<TopupRequest>, AppError> {
    let admin_id = require_admin(&context)?;

    let mut command = ProcessTopupCommand::new(admin_id, topup_id, request.decision);
    if let Some(notes) = request.admin_notes {
        command = command.with_notes(notes);
    }

    let handler = TopupHandler::new(pool);
    let topup = handler.process(command).await?;

    Ok(Json(topup))
}

// =========================================================================
// POST /admin/ledger/credit and /admin/ledger/debit
// =========================================================================

/// Credit a user's wallet directly
async fn ledger_credit(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<LedgerMoveRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    require_admin(&context)?;

    let amount = parse_amount(&request.amount)?;
    let ledger = WalletLedger::new(pool);
    let balance = ledger.credit(request.user_id, amount).await?;

    Ok(Json(BalanceResponse {
        user_id: request.user_id,
        balance,
    }))
}

/// Debit a user's wallet directly
async fn ledger_debit(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<LedgerMoveRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    require_admin(&context)?;

    let amount = parse_amount(&request.amount)?;
    let ledger = WalletLedger::new(pool);
    let balance = ledger.debit(request.user_id, amount).await?;

    Ok(Json(BalanceResponse {
        user_id: request.user_id,
        balance,
    }))
}
