//! Common test utilities

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Setup test database - truncate tables for a fresh state
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE wallet_topups, invitations, packages, templates, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Seed a user with the given role and starting balance
pub async fn seed_user(pool: &PgPool, role: &str, balance: Decimal) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, role, wallet_balance)
        VALUES ($1, $2, $3, $4::user_role, $5)
        "#,
    )
    .bind(user_id)
    .bind(format!("user-{user_id}@test.example"))
    .bind("Test User")
    .bind(role)
    .bind(balance)
    .execute(pool)
    .await
    .expect("Failed to seed user");

    user_id
}

/// Seed an active template
pub async fn seed_template(pool: &PgPool) -> Uuid {
    let template_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO templates (id, name, template_data)
        VALUES ($1, 'Classic', '{"layout": "classic"}')
        "#,
    )
    .bind(template_id)
    .execute(pool)
    .await
    .expect("Failed to seed template");

    template_id
}

/// Seed an active package with the given price
pub async fn seed_package(pool: &PgPool, price: Decimal) -> Uuid {
    let package_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO packages (id, name, price, features)
        VALUES ($1, 'Standard', $2, '["rsvp", "guest_book"]')
        "#,
    )
    .bind(package_id)
    .bind(price)
    .execute(pool)
    .await
    .expect("Failed to seed package");

    package_id
}
