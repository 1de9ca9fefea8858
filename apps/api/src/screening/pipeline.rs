//! Screening Pipeline.
//!
//! Scoring: post lookup → store upload → extract text → scoring prompt →
//!          AI gateway (post credential) → persist apply + detail.
//! Interview: apply lookup → post lookup → re-extract stored resume →
//!            interview prompt → AI gateway → overwrite detail.interview.
//!
//! Nothing is written to the database unless the gateway call succeeds.
//! A stored upload is left in place when a later step fails.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

use crate::applies::store::{self as apply_store, NewApply, NewDetail};
use crate::errors::AppError;
use crate::extraction::{self, extension_of};
use crate::gateway::{Gateway, GatewayError};
use crate::models::apply::{ApplyWithDetail, Interview, InterviewQuestion};
use crate::posts::store as post_store;
use crate::screening::language::Language;
use crate::screening::prompts::{interview_prompt, interview_schema, scoring_prompt, scoring_schema};
use crate::storage::{resume_key, ResumeStorage};

const SCORING_FAILED: &str = "An error occurred while creating the application";
const INTERVIEW_FAILED: &str = "An error occurred while generating interview questions";

/// A validated candidate submission, resume bytes included.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub post_id: i64,
    /// Client-side file name; only its extension is used.
    pub file_name: String,
    pub resume: Bytes,
}

/// Result of a successful scoring run.
#[derive(Debug, Clone)]
pub struct ScoredApplication {
    pub application: ApplyWithDetail,
    /// The fields as the model returned them.
    pub scores: NewDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewSheet {
    pub candidate: Candidate,
    pub interview_questions: Vec<InterviewQuestion>,
    pub language: &'static str,
}

/// Structured scoring reply. Numbers pass through unclamped.
#[derive(Debug, Deserialize)]
struct ScoreReply {
    skills: Vec<String>,
    #[serde(deserialize_with = "whole_years")]
    experience: i64,
    skills_match: f64,
    ai_score: f64,
}

// Models occasionally answer `4.0` for an integer field.
fn whole_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(f64::deserialize(deserializer)?.round() as i64)
}

fn scoring_failed(cause: impl std::fmt::Display) -> AppError {
    AppError::operation(SCORING_FAILED, cause)
}

fn interview_failed(cause: impl std::fmt::Display) -> AppError {
    AppError::operation(INTERVIEW_FAILED, cause)
}

fn parse_scores(reply: Value) -> Result<NewDetail, GatewayError> {
    let parsed = ScoreReply::deserialize(&reply)
        .map_err(|_| GatewayError::MalformedResponse { body: reply.clone() })?;
    Ok(NewDetail {
        skills: parsed.skills,
        experience: parsed.experience,
        skills_match: parsed.skills_match,
        ai_score: parsed.ai_score,
    })
}

fn parse_interview(reply: Value) -> Result<Interview, GatewayError> {
    Interview::deserialize(&reply).map_err(|_| GatewayError::MalformedResponse { body: reply.clone() })
}

/// Runs the scoring flow for one submission.
pub async fn score_application(
    pool: &SqlitePool,
    storage: &dyn ResumeStorage,
    gateway: &dyn Gateway,
    submission: Submission,
) -> Result<ScoredApplication, AppError> {
    let post = post_store::find_post(pool, submission.post_id)
        .await
        .map_err(scoring_failed)?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", submission.post_id)))?;

    let extension = extension_of(&submission.file_name);
    let key = resume_key(&extension);
    storage
        .put(&key, submission.resume)
        .await
        .map_err(scoring_failed)?;
    info!("Stored resume for post {} under {key}", post.id);

    let resume_text = extraction::extract(storage, &key, &extension)
        .await
        .map_err(scoring_failed)?;

    let prompt = scoring_prompt(&resume_text, &post.description);
    let reply = gateway
        .generate(&post.token, &prompt, &scoring_schema())
        .await?;
    let scores = parse_scores(reply)?;

    let apply = NewApply {
        name: submission.name,
        email: submission.email,
        phone: submission.phone,
        resume_path: key,
        post_id: post.id,
    };
    let application = apply_store::create_with_detail(pool, &apply, &scores)
        .await
        .map_err(scoring_failed)?;
    info!(
        "Scored application {} for post {}: ai_score={}, skills_match={}",
        application.apply.id, post.id, scores.ai_score, scores.skills_match
    );

    Ok(ScoredApplication {
        application,
        scores,
    })
}

/// Generates interview questions for an existing application in `language`.
///
/// The questions are returned even when the application has no detail row
/// to store them on.
pub async fn generate_interview(
    pool: &SqlitePool,
    storage: &dyn ResumeStorage,
    gateway: &dyn Gateway,
    apply_id: i64,
    language: Language,
) -> Result<InterviewSheet, AppError> {
    let record = apply_store::find(pool, apply_id)
        .await
        .map_err(interview_failed)?
        .ok_or_else(|| AppError::NotFound(format!("Application {apply_id} not found")))?;
    let apply = record.apply;

    let post = post_store::find_post(pool, apply.post_id)
        .await
        .map_err(interview_failed)?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", apply.post_id)))?;

    let extension = extension_of(&apply.resume_path);
    let resume_text = extraction::extract(storage, &apply.resume_path, &extension)
        .await
        .map_err(interview_failed)?;

    let prompt = interview_prompt(&resume_text, language.name());
    let reply = gateway
        .generate(&post.token, &prompt, &interview_schema())
        .await?;
    let interview = parse_interview(reply)?;

    let saved = apply_store::save_interview(pool, apply.id, &interview)
        .await
        .map_err(interview_failed)?;
    if saved {
        info!(
            "Stored {} interview questions on application {}",
            interview.questions.len(),
            apply.id
        );
    } else {
        info!("Application {} has no detail; interview not stored", apply.id);
    }

    Ok(InterviewSheet {
        candidate: Candidate {
            name: apply.name,
            email: apply.email,
        },
        interview_questions: interview.questions,
        language: language.name(),
    })
}
