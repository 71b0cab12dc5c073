//! Client for the hosted backend service.
//!
//! # Architecture
//!
//! - Table reads and writes go through the [`Backend`] trait, which speaks in
//!   structured [`Query`] values and raw JSON rows
//! - [`RestBackend`] implements it over the service's PostgREST dialect
//!   (`/rest/v1/<table>`, `/rest/v1/rpc/<fn>`) with `reqwest`
//! - Auth (`/auth/v1`) and object storage (`/storage/v1`) have their own
//!   clients in [`auth`] and [`storage`]
//! - The typed helpers ([`fetch_all`], [`fetch_optional`], ...) deserialize
//!   rows into `techspec_core` models
//!
//! Nothing here retries. A failed call is reported once and the caller
//! decides what to do with it.

pub mod auth;
#[cfg(any(test, feature = "test-support"))]
mod memory;
pub mod query;
mod rest;
pub mod storage;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use auth::{AuthApi, AuthError, AuthSession, AuthUser, GoTrueClient, OtpType, SignUpOutcome};
#[cfg(any(test, feature = "test-support"))]
pub use memory::{Call, MemoryBackend, Op};
pub use query::{Column, Direction, Filter, Query, contains_pattern, escape_like};
pub use rest::{BackendConfig, RestBackend};
pub use storage::StorageClient;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service refused the request (bad filter, constraint violation,
    /// row-level security). Carries the service's own error code.
    #[error("Rejected ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Any other non-success response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A write returned no row.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A maybe-single read matched more than one row.
    #[error("Expected at most one row, got {0}")]
    Cardinality(usize),
}

impl BackendError {
    /// Whether the service refused the request itself (as opposed to a
    /// transport or server failure).
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Row operations against the hosted store.
///
/// Every method maps to exactly one remote call.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Insert one row (or an array of rows) and return what was stored.
    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, BackendError>;

    /// Apply `patch` to every row matching the predicates of `query` and
    /// return the updated rows. An empty result means nothing matched.
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError>;

    /// Insert `row`, merging into the existing row when the `on_conflict`
    /// columns collide.
    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Vec<Value>, BackendError>;

    /// Call a remote procedure. Procedures without a result yield `Value::Null`.
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError>;

    /// A handle that makes calls on behalf of the user owning `access_token`,
    /// so row-level policies see that user.
    fn with_access_token(&self, access_token: &SecretString) -> Arc<dyn Backend>;
}

/// Read and deserialize every row matching `query`.
///
/// # Errors
///
/// Returns an error if the call fails or a row does not match `T`.
pub async fn fetch_all<T: DeserializeOwned>(
    backend: &dyn Backend,
    query: &Query,
) -> Result<Vec<T>, BackendError> {
    let rows = backend.select(query).await?;
    decode_rows(rows)
}

/// Read at most one row. Zero rows is `Ok(None)`.
///
/// # Errors
///
/// Returns [`BackendError::Cardinality`] if more than one row matched.
pub async fn fetch_optional<T: DeserializeOwned>(
    backend: &dyn Backend,
    query: &Query,
) -> Result<Option<T>, BackendError> {
    let mut rows = backend.select(query).await?;
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop().map(serde_json::from_value).transpose()?),
        n => Err(BackendError::Cardinality(n)),
    }
}

/// Insert one row and deserialize the stored representation.
///
/// # Errors
///
/// Returns an error if the insert fails or the service returns no row.
pub async fn insert_returning<T, R>(
    backend: &dyn Backend,
    table: &str,
    row: &R,
) -> Result<T, BackendError>
where
    T: DeserializeOwned,
    R: Serialize + Sync,
{
    let rows = backend.insert(table, serde_json::to_value(row)?).await?;
    let stored = rows
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(format!("{table}: insert returned no row")))?;
    Ok(serde_json::from_value(stored)?)
}

/// Call a remote procedure and deserialize its result.
///
/// # Errors
///
/// Returns an error if the call fails or the result does not match `T`.
pub async fn call_rpc<T: DeserializeOwned>(
    backend: &dyn Backend,
    function: &str,
    args: Value,
) -> Result<T, BackendError> {
    let value = backend.rpc(function, args).await?;
    Ok(serde_json::from_value(value)?)
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, BackendError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}
