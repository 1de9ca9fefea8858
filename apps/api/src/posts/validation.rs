use serde::Deserialize;

use crate::errors::{AppError, FieldErrors};

const MAX_SHORT_TEXT: usize = 255;

/// Body of `POST /posts`. Every field is optional at the serde layer so that
/// missing values surface as per-field validation errors, not a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<SkillsField>,
    pub city: Option<String>,
    pub min_experience: Option<i64>,
    pub education_level: Option<i64>,
}

/// Skills arrive either as a JSON array or as a string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SkillsField {
    List(Vec<String>),
    Encoded(String),
}

/// A post that passed validation and is ready for the credential check.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub token: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub city: String,
    pub min_experience: i64,
    pub education_level: Option<i64>,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<NewPost, AppError> {
        let mut errors = FieldErrors::new();

        let token = required_text(&mut errors, "token", self.token, None);
        let title = required_text(&mut errors, "title", self.title, Some(MAX_SHORT_TEXT));
        let description = required_text(&mut errors, "description", self.description, None);
        let city = required_text(&mut errors, "city", self.city, Some(MAX_SHORT_TEXT));
        let skills = skills_list(&mut errors, self.skills);
        let min_experience = match self.min_experience {
            None => {
                reject(&mut errors, "min_experience", "The min experience field is required.");
                None
            }
            Some(n) if n < 0 => {
                reject(&mut errors, "min_experience", "The min experience must be at least 0.");
                None
            }
            Some(n) => Some(n),
        };
        if matches!(self.education_level, Some(n) if n < 0) {
            reject(&mut errors, "education_level", "The education level must be at least 0.");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        match (token, title, description, skills, city, min_experience) {
            (Some(token), Some(title), Some(description), Some(skills), Some(city), Some(min)) => {
                Ok(NewPost {
                    token,
                    title,
                    description,
                    skills,
                    city,
                    min_experience: min,
                    education_level: self.education_level,
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

fn reject(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_len: Option<usize>,
) -> Option<String> {
    let label = field.replace('_', " ");
    match value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    {
        None => {
            reject(errors, field, &format!("The {label} field is required."));
            None
        }
        Some(v) => match max_len {
            Some(max) if v.chars().count() > max => {
                reject(
                    errors,
                    field,
                    &format!("The {label} may not be greater than {max} characters."),
                );
                None
            }
            _ => Some(v),
        },
    }
}

fn skills_list(errors: &mut FieldErrors, value: Option<SkillsField>) -> Option<Vec<String>> {
    let skills = match value {
        None => {
            reject(errors, "skills", "The skills field is required.");
            return None;
        }
        Some(SkillsField::List(list)) => list,
        Some(SkillsField::Encoded(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => list,
            Err(_) => {
                reject(errors, "skills", "The skills must be a valid JSON list of strings.");
                return None;
            }
        },
    };

    let skills: Vec<String> = skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        reject(errors, "skills", "The skills field is required.");
        return None;
    }
    Some(skills)
}
