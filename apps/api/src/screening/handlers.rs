//! Axum route handlers for interview generation.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::Envelope;
use crate::screening::language::Language;
use crate::screening::pipeline::{generate_interview, InterviewSheet};
use crate::state::AppState;

/// POST /interview/:apply_id (English) questions.
pub async fn handle_interview(
    State(state): State<AppState>,
    Path(apply_id): Path<i64>,
) -> Result<Json<Envelope<InterviewSheet>>, AppError> {
    interview(&state, apply_id, Language::default()).await
}

/// POST /interview/:apply_id/:lang
pub async fn handle_interview_in(
    State(state): State<AppState>,
    Path((apply_id, lang)): Path<(i64, String)>,
) -> Result<Json<Envelope<InterviewSheet>>, AppError> {
    interview(&state, apply_id, Language::from_code(Some(&lang))).await
}

async fn interview(
    state: &AppState,
    apply_id: i64,
    language: Language,
) -> Result<Json<Envelope<InterviewSheet>>, AppError> {
    let sheet = generate_interview(
        &state.db,
        state.storage.as_ref(),
        state.gateway.as_ref(),
        apply_id,
        language,
    )
    .await?;
    Ok(Json(Envelope::ok(sheet)))
}
