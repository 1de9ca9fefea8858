// Prompt templates and output schemas for the screening calls.

use crate::gateway::Schema;

/// Scoring instructions; the resume text and job description follow them.
pub const SCORING_INSTRUCTIONS: &str = "Analyze the following resume text and job post, \
extract the candidate's skills, and years of experience, then return a JSON object with a \
skills list, years of experience, a skills match score between 0 and 1 (based only on skills \
compared to the job post), and an AI score between 0 and 10 (based on skills, years of \
experience, and overall fit probability and be strict). Provide the output as a JSON object \
according to the specified schema.";

pub const INTERVIEW_INSTRUCTIONS: &str = "Based on the following resume, generate 5 \
technical interview questions with detailed model answers. The questions should be challenging \
and specific to the candidate's skills and experience.";

pub fn scoring_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "{SCORING_INSTRUCTIONS}\n\nResume Text:\n{resume_text}\n\nJob Post Description:\n{job_description}"
    )
}

pub fn interview_prompt(resume_text: &str, language: &str) -> String {
    format!(
        "{INTERVIEW_INSTRUCTIONS} Provide the output in {language}.\n\nResume Text:\n{resume_text}"
    )
}

/// `{skills: [string], experience: integer, skills_match: number, ai_score: number}`
pub fn scoring_schema() -> Schema {
    Schema::object([
        ("skills", Schema::array(Schema::String)),
        ("experience", Schema::Integer),
        ("skills_match", Schema::Number),
        ("ai_score", Schema::Number),
    ])
}

/// `{questions: [{question: string, answer: string}]}`
pub fn interview_schema() -> Schema {
    Schema::object([(
        "questions",
        Schema::array(Schema::object([
            ("question", Schema::String),
            ("answer", Schema::String),
        ])),
    )])
}
