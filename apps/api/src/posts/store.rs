//! Job Post Store.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::applies;
use crate::models::post::{DashboardPost, PostRow};
use crate::posts::tokens::PostTokens;
use crate::posts::validation::NewPost;

pub async fn insert_post(
    pool: &SqlitePool,
    post: &NewPost,
    tokens: &PostTokens,
) -> Result<PostRow, sqlx::Error> {
    sqlx::query_as::<_, PostRow>(
        r#"
        INSERT INTO posts
            (token, title, description, skills, city, min_experience, education_level,
             access_token, share, dashboard)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&post.token)
    .bind(&post.title)
    .bind(&post.description)
    .bind(Json(post.skills.clone()))
    .bind(&post.city)
    .bind(post.min_experience)
    .bind(post.education_level)
    .bind(&tokens.access_token)
    .bind(&tokens.share)
    .bind(&tokens.dashboard)
    .fetch_one(pool)
    .await
}

pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>("SELECT * FROM posts ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_post(pool: &SqlitePool, id: i64) -> Result<Option<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_share(pool: &SqlitePool, share: &str) -> Result<Option<PostRow>, sqlx::Error> {
    sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE share = ? LIMIT 1")
        .bind(share)
        .fetch_optional(pool)
        .await
}

/// The post behind a dashboard token, with every application and detail.
pub async fn find_dashboard(
    pool: &SqlitePool,
    dashboard: &str,
) -> Result<Option<DashboardPost>, sqlx::Error> {
    let Some(post) = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE dashboard = ? LIMIT 1")
        .bind(dashboard)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let applies = applies::store::list_for_post(pool, post.id).await?;
    let dashboard = post.dashboard.clone();
    Ok(Some(DashboardPost {
        post: post.into(),
        dashboard,
        applies,
    }))
}

/// Removes the post; applies and details follow through `ON DELETE CASCADE`.
pub async fn delete_by_dashboard(pool: &SqlitePool, dashboard: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE dashboard = ?")
        .bind(dashboard)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// True only when one post carries both this dashboard token and this access token.
pub async fn dashboard_access_granted(
    pool: &SqlitePool,
    dashboard: &str,
    access_token: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE dashboard = ? AND access_token = ?)",
    )
    .bind(dashboard)
    .bind(access_token)
    .fetch_one(pool)
    .await
}
