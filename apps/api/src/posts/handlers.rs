//! Axum route handlers for job posts and the recruiter dashboard.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::post::{CreatedPost, DashboardPost, PostView};
use crate::models::Envelope;
use crate::posts::store;
use crate::posts::tokens::PostTokens;
use crate::posts::validation::CreatePostRequest;
use crate::state::AppState;

/// POST /posts
///
/// Validates the body, pings the AI gateway with the supplied key, then
/// stores the post with freshly minted access/share/dashboard tokens.
pub async fn handle_create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<CreatedPost>>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::invalid("body", e.body_text()))?;
    let new_post = request.validate()?;

    if !state.gateway.validate_credential(&new_post.token).await {
        info!("Rejected post creation: AI gateway refused the credential");
        return Err(AppError::InvalidCredential);
    }

    let tokens = PostTokens::generate();
    let row = store::insert_post(&state.db, &new_post, &tokens)
        .await
        .map_err(|e| AppError::operation("An error occurred while creating the post", e))?;
    info!("Created post {}", row.id);

    Ok((StatusCode::CREATED, Json(Envelope::ok(row.into()))))
}

/// GET /posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostView>>, AppError> {
    let posts = store::list_posts(&state.db).await?;
    Ok(Json(posts.into_iter().map(PostView::from).collect()))
}

/// GET /posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostView>, AppError> {
    let post = store::find_post(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;
    Ok(Json(post.into()))
}

/// GET /share/:share (public, no gate)
pub async fn handle_get_shared_post(
    State(state): State<AppState>,
    Path(share): Path<String>,
) -> Result<Json<PostView>, AppError> {
    let post = store::find_by_share(&state.db, &share)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(Json(post.into()))
}

/// GET /dashboard/:dashboard, behind the access gate.
pub async fn handle_get_dashboard(
    State(state): State<AppState>,
    Path(dashboard): Path<String>,
) -> Result<Json<Envelope<DashboardPost>>, AppError> {
    let post = store::find_dashboard(&state.db, &dashboard)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(Json(Envelope::ok(post)))
}

/// DELETE /dashboard/:dashboard, behind the access gate. Cascades to applies and details.
pub async fn handle_delete_dashboard(
    State(state): State<AppState>,
    Path(dashboard): Path<String>,
) -> Result<Json<Value>, AppError> {
    let removed = store::delete_by_dashboard(&state.db, &dashboard)
        .await
        .map_err(|e| AppError::operation("An error occurred while deleting the post", e))?;
    if removed == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    info!("Deleted post behind a dashboard token with all applications");

    Ok(Json(json!({
        "success": true,
        "message": "Post and all associated data deleted successfully"
    })))
}
