pub mod models;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use util::config;

/// Connects to the configured database.
///
/// `DATABASE_PATH` may be a full DSN (`sqlite:...`) or a plain SQLite file path,
/// in which case the parent directory is created and the file opened in `rwc` mode.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    connect_to(&config::database_path()).await
}

pub async fn connect_to(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    let url = if path_or_url.starts_with("sqlite:") {
        path_or_url.to_string()
    } else {
        // SQLite won't create intermediate dirs
        if let Some(parent) = Path::new(path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false);

    tracing::info!(target: "db", "Connecting to {}", path_or_url);
    Database::connect(opts).await
}
