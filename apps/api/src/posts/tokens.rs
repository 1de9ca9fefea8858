use rand::distributions::{Alphanumeric, DistString};

const ACCESS_TOKEN_LEN: usize = 60;
const SHARE_TOKEN_LEN: usize = 10;
const DASHBOARD_TOKEN_LEN: usize = 10;

/// The three capability secrets minted for every new post.
#[derive(Debug, Clone)]
pub struct PostTokens {
    pub access_token: String,
    pub share: String,
    pub dashboard: String,
}

impl PostTokens {
    pub fn generate() -> Self {
        PostTokens {
            access_token: random_token(ACCESS_TOKEN_LEN),
            share: random_token(SHARE_TOKEN_LEN),
            dashboard: random_token(DASHBOARD_TOKEN_LEN),
        }
    }
}

/// Alphanumeric string drawn from the thread-local CSPRNG.
pub fn random_token(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}
