//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Root URL of the hosted backend service
//! - `BACKEND_ANON_KEY` - Public key (sitemap, search, stats)
//! - `BACKEND_SERVICE_KEY` - Service key for `import` (falls back to
//!   `BACKEND_ANON_KEY`, which row level security will usually refuse)

pub mod import;
pub mod search;
pub mod sitemap;
pub mod stats;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use techspec_admin::services::ImportError;
use techspec_storefront::backend::{BackendConfig, BackendError};
use techspec_storefront::search::SearchError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Environment variable present but unusable.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Sitemap rendering failed: {0}")]
    Xml(Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which backend key a command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Anon,
    Service,
}

/// Backend connection settings from the environment (`.env` if present).
///
/// # Errors
///
/// Returns an error if `BACKEND_URL` or the key is missing or invalid.
pub fn backend_config(key: Key) -> Result<BackendConfig, CommandError> {
    dotenvy::dotenv().ok();

    let raw = std::env::var("BACKEND_URL").map_err(|_| CommandError::MissingEnvVar("BACKEND_URL"))?;
    let url = Url::parse(&raw).map_err(|e| CommandError::InvalidEnvVar("BACKEND_URL", e.to_string()))?;

    let api_key = match key {
        Key::Service => match std::env::var("BACKEND_SERVICE_KEY") {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("BACKEND_SERVICE_KEY not set, falling back to BACKEND_ANON_KEY");
                anon_key()?
            }
        },
        Key::Anon => anon_key()?,
    };

    Ok(BackendConfig {
        url,
        api_key: SecretString::from(api_key),
    })
}

fn anon_key() -> Result<String, CommandError> {
    std::env::var("BACKEND_ANON_KEY").map_err(|_| CommandError::MissingEnvVar("BACKEND_ANON_KEY"))
}
