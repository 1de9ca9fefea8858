//! Application Store: `applies` and their 1:1 `details`.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::apply::{ApplyRow, ApplyWithDetail, DetailRow, Interview};

#[derive(Debug, Clone)]
pub struct NewApply {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_path: String,
    pub post_id: i64,
}

/// Scoring fields exactly as the model returned them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDetail {
    pub skills: Vec<String>,
    pub experience: i64,
    pub skills_match: f64,
    pub ai_score: f64,
}

/// Inserts the apply and its detail in one transaction.
pub async fn create_with_detail(
    pool: &SqlitePool,
    apply: &NewApply,
    detail: &NewDetail,
) -> Result<ApplyWithDetail, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let apply_row = sqlx::query_as::<_, ApplyRow>(
        r#"
        INSERT INTO applies (name, email, phone, resume_path, post_id)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&apply.name)
    .bind(&apply.email)
    .bind(&apply.phone)
    .bind(&apply.resume_path)
    .bind(apply.post_id)
    .fetch_one(&mut *tx)
    .await?;

    let detail_row = sqlx::query_as::<_, DetailRow>(
        r#"
        INSERT INTO details (skills, experience, skills_match, ai_score, apply_id)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Json(detail.skills.clone()))
    .bind(detail.experience)
    .bind(detail.skills_match)
    .bind(detail.ai_score)
    .bind(apply_row.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ApplyWithDetail {
        apply: apply_row,
        detail: Some(detail_row),
    })
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ApplyWithDetail>, sqlx::Error> {
    let applies = sqlx::query_as::<_, ApplyRow>("SELECT * FROM applies ORDER BY id")
        .fetch_all(pool)
        .await?;
    let details = sqlx::query_as::<_, DetailRow>("SELECT * FROM details")
        .fetch_all(pool)
        .await?;
    Ok(attach_details(applies, details))
}

pub async fn list_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<ApplyWithDetail>, sqlx::Error> {
    let applies =
        sqlx::query_as::<_, ApplyRow>("SELECT * FROM applies WHERE post_id = ? ORDER BY id")
            .bind(post_id)
            .fetch_all(pool)
            .await?;
    let details = sqlx::query_as::<_, DetailRow>(
        "SELECT d.* FROM details d JOIN applies a ON a.id = d.apply_id WHERE a.post_id = ?",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(attach_details(applies, details))
}

pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<ApplyWithDetail>, sqlx::Error> {
    let Some(apply) = sqlx::query_as::<_, ApplyRow>("SELECT * FROM applies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let detail = sqlx::query_as::<_, DetailRow>("SELECT * FROM details WHERE apply_id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(Some(ApplyWithDetail { apply, detail }))
}

/// Flips `is_favorite`; `None` when the apply does not exist.
pub async fn toggle_favorite(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<ApplyWithDetail>, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE applies SET is_favorite = NOT is_favorite, updated_at = ? WHERE id = ?",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Ok(None);
    }
    find(pool, id).await
}

/// Deletes an apply; its detail goes with it through the foreign key.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM applies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted > 0)
}

/// Overwrites the interview on the apply's detail. Returns false when there is no detail.
pub async fn save_interview(
    pool: &SqlitePool,
    apply_id: i64,
    interview: &Interview,
) -> Result<bool, sqlx::Error> {
    let updated =
        sqlx::query("UPDATE details SET interview = ?, updated_at = ? WHERE apply_id = ?")
            .bind(Json(interview.clone()))
            .bind(Utc::now())
            .bind(apply_id)
            .execute(pool)
            .await?
            .rows_affected();
    Ok(updated > 0)
}

fn attach_details(applies: Vec<ApplyRow>, details: Vec<DetailRow>) -> Vec<ApplyWithDetail> {
    let mut by_apply: HashMap<i64, DetailRow> =
        details.into_iter().map(|d| (d.apply_id, d)).collect();
    applies
        .into_iter()
        .map(|apply| {
            let detail = by_apply.remove(&apply.id);
            ApplyWithDetail { apply, detail }
        })
        .collect()
}
