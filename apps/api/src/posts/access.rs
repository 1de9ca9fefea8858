//! Access Gate for dashboard routes.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::posts::store::dashboard_access_granted;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccessTokenQuery {
    pub access_token: Option<String>,
}

/// Rejects the request unless `?access_token=` belongs to the post whose
/// dashboard token is in the path. Runs before the handler.
///
/// A query string that does not parse (a repeated key, say) is treated as
/// carrying no token.
pub async fn require_dashboard_access(
    State(state): State<AppState>,
    Path(dashboard): Path<String>,
    query: Result<Query<AccessTokenQuery>, QueryRejection>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access_token = query
        .ok()
        .and_then(|Query(query)| query.access_token)
        .filter(|t| !t.is_empty());
    let Some(access_token) = access_token else {
        warn!("Dashboard request without access token");
        return Err(AppError::Unauthorized);
    };

    if !dashboard_access_granted(&state.db, &dashboard, &access_token).await? {
        warn!("Dashboard request with mismatched access token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
