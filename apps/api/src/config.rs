use anyhow::{bail, Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gateway: GatewayConfig,
    pub storage: StorageBackend,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Connection details for the generative-AI endpoint.
///
/// Carries no credential: every post supplies its own key.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub model_id: String,
    pub generate_content_api: String,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local {
        root: String,
    },
    S3 {
        bucket: String,
        endpoint: Option<String>,
        region: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gateway: GatewayConfig {
                endpoint: require_env("GEMINI_API_ENDPOINT")?,
                model_id: require_env("MODEL_ID")?,
                generate_content_api: optional_env("GENERATE_CONTENT_API")
                    .unwrap_or_else(|| "generateContent".to_string()),
            },
            storage: storage_from_env()?,
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn storage_from_env() -> Result<StorageBackend> {
    let backend = optional_env("STORAGE_BACKEND").unwrap_or_else(|| "local".to_string());
    match backend.as_str() {
        "local" => Ok(StorageBackend::Local {
            root: optional_env("STORAGE_DIR")
                .unwrap_or_else(|| "storage/app/private".to_string()),
        }),
        "s3" => Ok(StorageBackend::S3 {
            bucket: require_env("S3_BUCKET")?,
            endpoint: optional_env("S3_ENDPOINT"),
            region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        }),
        other => bail!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
