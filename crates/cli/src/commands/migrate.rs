//! Session-store migrations.
//!
//! The only tables these services own are the `tower-sessions` stores; all
//! shop data lives in the backend.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront session store
//! - `ADMIN_DATABASE_URL` - admin session store (`admin.session`)
//!
//! Both fall back to `DATABASE_URL`.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn database_url(key: &'static str) -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();
    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(key))
}

async fn connect(key: &'static str) -> Result<PgPool, MigrationError> {
    let url = database_url(key)?;
    Ok(PgPool::connect(url.expose_secret()).await?)
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn storefront() -> Result<(), MigrationError> {
    info!("Connecting to storefront database...");
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    info!("Creating storefront session store...");
    PostgresStore::new(pool).migrate().await?;

    info!("Storefront migrations complete!");
    Ok(())
}

/// Create the admin session table in the `admin` schema.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn admin() -> Result<(), MigrationError> {
    info!("Connecting to admin database...");
    let pool = connect("ADMIN_DATABASE_URL").await?;

    info!("Creating admin session store...");
    jc_closet_admin::middleware::session::session_store(&pool)
        .migrate()
        .await?;

    info!("Admin migrations complete!");
    Ok(())
}
