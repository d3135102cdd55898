use std::sync::Arc;

use common::embed::EmbedValidator;
use common::storage::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::utils::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub media: Arc<dyn MediaStore>,
    pub embeds: Arc<EmbedValidator>,
    /// Per-IP limiter for the public contact form.
    pub contact_limiter: Arc<IpRateLimiter>,
}
