//! Embedded schema migrations.

use sqlx::migrate::Migrator;

/// Migrations from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
