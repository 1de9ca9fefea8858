use bytes::Bytes;

use crate::errors::{AppError, FieldErrors};
use crate::extraction::{extension_of, DocFormat};
use crate::screening::pipeline::Submission;

/// Raw multipart fields of `POST /applies`, before validation.
#[derive(Debug, Default)]
pub struct ApplyForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub post_id: Option<String>,
    /// Client file name and body of the `resume` part.
    pub resume: Option<(String, Bytes)>,
}

impl ApplyForm {
    pub fn validate(self) -> Result<Submission, AppError> {
        let mut errors = FieldErrors::new();

        let name = required(&mut errors, "name", self.name);
        let phone = required(&mut errors, "phone", self.phone);
        let email = required(&mut errors, "email", self.email).filter(|email| {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
            if !valid {
                reject(&mut errors, "email", "The email must be a valid email address.");
            }
            valid
        });
        let post_id = required(&mut errors, "post id", self.post_id).and_then(|raw| {
            let parsed = raw.parse::<i64>().ok();
            if parsed.is_none() {
                reject(&mut errors, "post_id", "The post id must be an integer.");
            }
            parsed
        });
        let resume = match self.resume {
            Some((_, bytes)) if bytes.is_empty() => {
                reject(&mut errors, "resume", "The resume field is required.");
                None
            }
            Some((file_name, bytes)) => {
                if DocFormat::from_extension(&extension_of(&file_name)).is_supported() {
                    Some((file_name, bytes))
                } else {
                    reject(&mut errors, "resume", "The resume must be a file of type: pdf, doc, docx.");
                    None
                }
            }
            None => {
                reject(&mut errors, "resume", "The resume field is required.");
                None
            }
        };

        match (name, email, phone, post_id, resume) {
            (Some(name), Some(email), Some(phone), Some(post_id), Some((file_name, resume)))
                if errors.is_empty() =>
            {
                Ok(Submission {
                    name,
                    email,
                    phone,
                    post_id,
                    file_name,
                    resume,
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

/// `label` is the human form of the field; the error key uses underscores.
fn required(errors: &mut FieldErrors, label: &str, value: Option<String>) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if value.is_none() {
        reject(
            errors,
            &label.replace(' ', "_"),
            &format!("The {label} field is required."),
        );
    }
    value
}
