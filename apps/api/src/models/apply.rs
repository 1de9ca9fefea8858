use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplyRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_path: String,
    pub post_id: i64,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DetailRow {
    pub id: i64,
    pub skills: Json<Vec<String>>,
    pub experience: i64,
    pub skills_match: f64,
    pub ai_score: f64,
    pub interview: Option<Json<Interview>>,
    pub apply_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Interview payload as stored on a detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyWithDetail {
    #[serde(flatten)]
    pub apply: ApplyRow,
    pub detail: Option<DetailRow>,
}
