// Job posts: creation behind a credential check, public share lookup, and
// the token-gated recruiter dashboard.

pub mod access;
pub mod handlers;
pub mod store;
pub mod tokens;
pub mod validation;
