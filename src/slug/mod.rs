//! Slug resolution
//!
//! Turns a bride/groom name pair into a globally unique, URL-safe slug.
//! The probe is read-only; callers insert the invitation with the returned
//! slug inside the same transaction, and the unique index on `lower(slug)`
//! closes the race between probe and insert.

use std::collections::HashSet;

use sqlx::{PgExecutor, PgPool};

/// Normalize a name for use in a slug: lowercase, strip everything outside
/// `[a-z0-9\s]`, collapse whitespace runs to single hyphens, trim.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Build the base slug candidate `{bride}-{groom}-wedding`, collapsing any
/// hyphen runs left behind by empty name parts.
pub fn base_slug(bride_name: &str, groom_name: &str) -> String {
    let raw = format!(
        "{}-{}-wedding",
        normalize_name(bride_name),
        normalize_name(groom_name)
    );

    let mut out = String::with_capacity(raw.len());
    let mut prev_hyphen = false;
    for c in raw.chars() {
        if c == '-' {
            if !prev_hyphen {
                out.push(c);
            }
            prev_hyphen = true;
        } else {
            out.push(c);
            prev_hyphen = false;
        }
    }
    out
}

/// Pick the first free candidate: `base`, then `base-1`, `base-2`, ...
/// `taken` must hold lowercased slugs; candidates are already lowercase, so
/// containment is a case-insensitive comparison.
pub fn next_available(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Resolves unique invitation slugs against the database.
#[derive(Debug, Clone)]
pub struct SlugResolver {
    pool: PgPool,
}

impl SlugResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a unique slug for the given names (read-only probe).
    pub async fn resolve(
        &self,
        bride_name: &str,
        groom_name: &str,
    ) -> Result<String, sqlx::Error> {
        resolve_unique(&self.pool, bride_name, groom_name).await
    }
}

/// Probe existing slugs and return the first free candidate. Runs against
/// any executor so creation can probe inside its own transaction.
pub(crate) async fn resolve_unique<'e, E>(
    executor: E,
    bride_name: &str,
    groom_name: &str,
) -> Result<String, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let base = base_slug(bride_name, groom_name);

    // base contains only [a-z0-9-], so it carries no LIKE wildcards
    let existing: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT lower(slug) FROM invitations
        WHERE lower(slug) = $1 OR lower(slug) LIKE $1 || '-%'
        "#,
    )
    .bind(&base)
    .fetch_all(executor)
    .await?;

    let taken: HashSet<String> = existing.into_iter().collect();
    Ok(next_available(&base, &taken))
}
