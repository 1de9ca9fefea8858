use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::apply::ApplyWithDetail;

/// Full `posts` row, secrets included. Never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: i64,
    /// The post's own generative-AI API key.
    pub token: String,
    pub title: String,
    pub description: String,
    pub skills: Json<Vec<String>>,
    pub city: String,
    pub min_experience: i64,
    pub education_level: Option<i64>,
    pub access_token: String,
    pub share: String,
    pub dashboard: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a post: no credential, no dashboard secrets.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub city: String,
    pub min_experience: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<i64>,
    pub share: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostRow> for PostView {
    fn from(row: PostRow) -> Self {
        PostView {
            id: row.id,
            title: row.title,
            description: row.description,
            skills: row.skills.0,
            city: row.city,
            min_experience: row.min_experience,
            education_level: row.education_level,
            share: row.share,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Returned once, at creation: the only response that carries the access token.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPost {
    #[serde(flatten)]
    pub post: PostView,
    pub access_token: String,
    pub dashboard: String,
}

impl From<PostRow> for CreatedPost {
    fn from(row: PostRow) -> Self {
        let access_token = row.access_token.clone();
        let dashboard = row.dashboard.clone();
        CreatedPost {
            post: row.into(),
            access_token,
            dashboard,
        }
    }
}

/// Dashboard read: the post with every application and its detail.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPost {
    #[serde(flatten)]
    pub post: PostView,
    pub dashboard: String,
    pub applies: Vec<ApplyWithDetail>,
}
