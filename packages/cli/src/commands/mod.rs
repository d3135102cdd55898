pub mod db;
pub mod embed;
pub mod user;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use server::config::AppConfig;

/// Resolve the database URL and open a pool without touching the schema.
pub async fn connect(database_url: Option<String>) -> anyhow::Result<DatabaseConnection> {
    let url = match database_url {
        Some(url) => url,
        None => {
            AppConfig::load()
                .context("Failed to load configuration; pass --database-url instead")?
                .database
                .url
        }
    };
    server::database::connect(&url)
        .await
        .context("Failed to connect to the database")
}
