//! Axum route handlers for candidate applications.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::applies::store::{self, NewDetail};
use crate::applies::validation::ApplyForm;
use crate::errors::AppError;
use crate::models::apply::ApplyWithDetail;
use crate::screening::pipeline::score_application;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedApplyResponse {
    pub success: bool,
    pub data: ApplyWithDetail,
    pub gemini_response: NewDetail,
}

/// POST /applies (multipart: name, email, phone, post_id, resume)
pub async fn handle_create_apply(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedApplyResponse>), AppError> {
    let submission = read_form(multipart).await?.validate()?;

    let scored = score_application(
        &state.db,
        state.storage.as_ref(),
        state.gateway.as_ref(),
        submission,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedApplyResponse {
            success: true,
            data: scored.application,
            gemini_response: scored.scores,
        }),
    ))
}

/// GET /applies
pub async fn handle_list_applies(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplyWithDetail>>, AppError> {
    Ok(Json(store::list_all(&state.db).await?))
}

/// GET /applies/:id
pub async fn handle_get_apply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApplyWithDetail>, AppError> {
    store::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PATCH /applies/:id flips the favourite flag.
pub async fn handle_toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApplyWithDetail>, AppError> {
    store::toggle_favorite(&state.db, id)
        .await
        .map_err(|e| AppError::operation("An error occurred while updating the application", e))?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /applies/:id
pub async fn handle_delete_apply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = store::delete(&state.db, id)
        .await
        .map_err(|e| AppError::operation("An error occurred while deleting the application", e))?;
    if !deleted {
        return Err(not_found(id));
    }
    info!("Deleted application {id}");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

/// Collects the known parts; unknown parts are skipped.
async fn read_form(mut multipart: Multipart) -> Result<ApplyForm, AppError> {
    let mut form = ApplyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid("body", e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field_bytes(field, "resume").await?;
                form.resume = Some((file_name, bytes));
            }
            "name" => form.name = Some(field_text(field, "name").await?),
            "email" => form.email = Some(field_text(field, "email").await?),
            "phone" => form.phone = Some(field_text(field, "phone").await?),
            "post_id" => form.post_id = Some(field_text(field, "post_id").await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn field_text(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::invalid(name, e.body_text()))
}

async fn field_bytes(field: Field<'_>, name: &str) -> Result<Bytes, AppError> {
    field
        .bytes()
        .await
        .map_err(|e| AppError::invalid(name, e.body_text()))
}
