// Candidate applications and their AI-derived details.

pub mod handlers;
pub mod store;
pub mod validation;
