//! Seed command: demo catalog and accounts for local development.
//!
//! Idempotent: articles are matched by name, accounts by username, so
//! re-running the command changes nothing.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::Role;

use super::CommandError;

/// Demo articles: name and price.
const ARTICLES: &[(&str, i64)] = &[
    ("Tisch 'Oval'", 10900),
    ("Stuhl 'Sitz'", 4900),
    ("Schrank 'Hoch'", 24900),
    ("Regal 'Wand'", 7900),
    ("Lampe 'Hell'", 2950),
];

/// Seed the database.
///
/// Creates the demo articles, a customer account (`demo` / `demo-pass!1`)
/// and a staff account (`chef` / `chef-pass!1`).
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a statement
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    seed_articles(&pool).await?;
    seed_account(&pool, "demo", "demo@example.com", "Dora", "Demo", "demo-pass!1", &[
        Role::Customer,
    ])
    .await?;
    seed_account(&pool, "chef", "chef@example.com", "Carla", "Chef", "chef-pass!1", &[
        Role::Admin,
        Role::Employee,
        Role::Customer,
    ])
    .await?;

    tracing::info!("Seed complete!");
    Ok(())
}

async fn seed_articles(pool: &PgPool) -> Result<(), CommandError> {
    for (name, cents) in ARTICLES {
        let inserted = sqlx::query(
            r"
            INSERT INTO article (name, price, in_stock)
            SELECT $1, $2, TRUE
            WHERE NOT EXISTS (SELECT 1 FROM article WHERE name = $1)
            ",
        )
        .bind(name)
        .bind(Decimal::new(*cents, 2))
        .execute(pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(article = name, "seeded article");
        }
    }
    Ok(())
}

async fn seed_account(
    pool: &PgPool,
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
    roles: &[Role],
) -> Result<(), CommandError> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM customer WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string();

    let (customer_id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO customer (username, email, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(username)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(&password_hash)
    .fetch_one(pool)
    .await?;

    for role in roles {
        sqlx::query(
            r"
            INSERT INTO customer_role (customer_id, role)
            VALUES ($1, $2)
            ON CONFLICT (customer_id, role) DO NOTHING
            ",
        )
        .bind(customer_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    }

    tracing::info!(username, roles = ?roles, "seeded account");
    Ok(())
}
