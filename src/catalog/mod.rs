//! Catalog lookups
//!
//! Read-only access to templates and packages. The catalog is maintained
//! elsewhere; this core only checks existence and activity, and reads the
//! package price at publish time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::{DomainError, Money};
use crate::error::AppError;

/// An invitation design template.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub preview_image: Option<String>,
    /// JSON document describing the layout
    pub template_data: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A paid publishing package.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "rust_decimal::Decimal")]
    pub price: Money,
    /// JSON array of feature descriptions
    pub features: serde_json::Value,
    pub max_guests: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Read-only catalog store.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a template that exists and is active.
    pub async fn active_template(&self, template_id: Uuid) -> Result<Template, AppError> {
        active_template(&self.pool, template_id).await
    }

    /// Fetch a package that exists and is active.
    pub async fn active_package(&self, package_id: Uuid) -> Result<Package, AppError> {
        active_package(&self.pool, package_id).await
    }
}

pub(crate) async fn active_template<'e, E>(
    executor: E,
    template_id: Uuid,
) -> Result<Template, AppError>
where
    E: PgExecutor<'e>,
{
    let template: Option<Template> = sqlx::query_as(
        r#"
        SELECT id, name, description, preview_image, template_data, is_active, created_at
        FROM templates
        WHERE id = $1 AND is_active = TRUE
        "#,
    )
    .bind(template_id)
    .fetch_optional(executor)
    .await?;

    template.ok_or_else(|| DomainError::TemplateNotFound(template_id).into())
}

pub(crate) async fn active_package<'e, E>(
    executor: E,
    package_id: Uuid,
) -> Result<Package, AppError>
where
    E: PgExecutor<'e>,
{
    let package: Option<Package> = sqlx::query_as(
        r#"
        SELECT id, name, description, price, features, max_guests, is_active, created_at
        FROM packages
        WHERE id = $1 AND is_active = TRUE
        "#,
    )
    .bind(package_id)
    .fetch_optional(executor)
    .await?;

    package.ok_or_else(|| DomainError::PackageNotFound(package_id).into())
}

/// Fetch a package by id regardless of activity. Publishing keeps working
/// for invitations whose package was retired after creation.
pub(crate) async fn package_by_id<'e, E>(executor: E, package_id: Uuid) -> Result<Package, AppError>
where
    E: PgExecutor<'e>,
{
    let package: Option<Package> = sqlx::query_as(
        r#"
        SELECT id, name, description, price, features, max_guests, is_active, created_at
        FROM packages
        WHERE id = $1
        "#,
    )
    .bind(package_id)
    .fetch_optional(executor)
    .await?;

    package.ok_or_else(|| DomainError::PackageNotFound(package_id).into())
}
