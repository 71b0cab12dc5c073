//! CSV product import from a local file.
//!
//! Same rules as the admin endpoint: the header must carry `name`, `brand`,
//! `model` and `price`; every data row is reported.

use std::path::Path;

use tracing::{info, warn};

use techspec_admin::services::{ProductImporter, RowOutcome, RowResult};
use techspec_storefront::backend::{Backend, RestBackend};

use super::{CommandError, Key, backend_config};

/// Imported and failed row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub imported: usize,
    pub failed: usize,
}

impl Summary {
    #[must_use]
    pub fn of(results: &[RowResult]) -> Self {
        let imported = results.iter().filter(|r| r.is_imported()).count();
        Self {
            imported,
            failed: results.len() - imported,
        }
    }
}

/// Import `content` and log one line per row.
///
/// # Errors
///
/// Returns an error for empty content or a header missing a required
/// column. Rejected rows are reported, not returned as errors.
pub async fn import_content(backend: &dyn Backend, content: &str) -> Result<Summary, CommandError> {
    let results = ProductImporter::new(backend).import(content).await?;

    for result in &results {
        match &result.outcome {
            RowOutcome::Imported { id } => info!(row = result.row, name = %result.name, %id, "Imported"),
            RowOutcome::Failed { error } => warn!(row = result.row, name = %result.name, error, "Rejected"),
        }
    }

    Ok(Summary::of(&results))
}

/// Import products from the CSV file at `path`.
///
/// # Errors
///
/// Returns an error if configuration is missing, the file cannot be read or
/// the CSV header is unusable.
pub async fn from_file(path: &Path) -> Result<Summary, CommandError> {
    let content = tokio::fs::read_to_string(path).await?;
    let backend = RestBackend::new(backend_config(Key::Service)?);

    info!(path = %path.display(), "Importing products");
    let summary = import_content(&backend, &content).await?;
    info!(imported = summary.imported, failed = summary.failed, "Import complete");
    Ok(summary)
}
