use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::gateway::Gateway;
use crate::storage::ResumeStorage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// AI gateway. `GeminiClient` in production.
    pub gateway: Arc<dyn Gateway>,
    /// Where uploaded resumes live.
    pub storage: Arc<dyn ResumeStorage>,
    pub config: Config,
}
