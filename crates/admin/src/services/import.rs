//! Bulk product import from CSV text.
//!
//! The header row names the columns (`name,brand,model,price,status,
//! category_slug`, any order, case-insensitive). Every data row yields one
//! [`RowResult`], so operators see exactly which rows were skipped and why.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use techspec_core::{CategoryId, NewProduct, Price, Product, ProductId, ProductStatus, Slug};
use techspec_storefront::backend::{Backend, BackendError, Query, fetch_optional, insert_returning};

/// Columns a header must name.
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "brand", "model", "price"];

/// Errors that reject the whole import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Missing CSV content")]
    Empty,

    #[error("CSV header is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Invalid CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// What happened to one data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RowOutcome {
    Imported { id: ProductId },
    Failed { error: String },
}

/// Per-row report: `{row, name, id}` or `{row, name, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    /// Line number in the submitted text (the header is line 1).
    pub row: u64,
    pub name: String,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

impl RowResult {
    #[must_use]
    pub const fn is_imported(&self) -> bool {
        matches!(self.outcome, RowOutcome::Imported { .. })
    }
}

/// Positions of the known columns in the header.
#[derive(Debug)]
struct Columns {
    name: usize,
    brand: usize,
    model: usize,
    price: usize,
    status: Option<usize>,
    category_slug: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, ImportError> {
        let names: Vec<String> = header.iter().map(|c| c.trim().to_lowercase()).collect();
        let find = |column: &str| names.iter().position(|n| n == column);
        let require = |column: &'static str| find(column).ok_or(ImportError::MissingColumn(column));

        Ok(Self {
            name: require(REQUIRED_COLUMNS[0])?,
            brand: require(REQUIRED_COLUMNS[1])?,
            model: require(REQUIRED_COLUMNS[2])?,
            price: require(REQUIRED_COLUMNS[3])?,
            status: find("status"),
            category_slug: find("category_slug"),
        })
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or_default().trim()
}

/// A data row that passed validation, waiting for its category.
#[derive(Debug)]
struct ValidRow {
    name: String,
    brand: String,
    model: String,
    price: Price,
    status: ProductStatus,
    category_slug: Option<String>,
}

fn validate(record: &StringRecord, columns: &Columns) -> Result<ValidRow, String> {
    let text = |index: usize, column: &str| {
        let value = field(record, Some(index));
        if value.is_empty() {
            Err(format!("missing {column}"))
        } else {
            Ok(value.to_string())
        }
    };

    let name = text(columns.name, "name")?;
    let brand = text(columns.brand, "brand")?;
    let model = text(columns.model, "model")?;
    let price = text(columns.price, "price")?
        .parse::<Price>()
        .map_err(|e| e.to_string())?;
    let status = match field(record, columns.status) {
        "" => ProductStatus::default(),
        raw => raw
            .to_lowercase()
            .parse::<ProductStatus>()
            .map_err(|e| e.to_string())?,
    };
    let category_slug = Some(field(record, columns.category_slug))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ValidRow {
        name,
        brand,
        model,
        price,
        status,
        category_slug,
    })
}

#[derive(serde::Deserialize)]
struct IdRow {
    id: CategoryId,
}

/// Imports products through a backend handle (service key).
pub struct ProductImporter<'a> {
    backend: &'a dyn Backend,
    categories: HashMap<String, Option<CategoryId>>,
}

impl<'a> ProductImporter<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            categories: HashMap::new(),
        }
    }

    /// Import every data row of `content`, one insert per valid row.
    ///
    /// Rows are processed in order and independently; a failing row never
    /// stops the ones after it.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Empty`] for blank input, `MissingColumn` when
    /// the header lacks a required column and `Malformed` for unreadable CSV.
    #[instrument(skip_all, fields(bytes = content.len()))]
    pub async fn import(&mut self, content: &str) -> Result<Vec<RowResult>, ImportError> {
        if content.trim().is_empty() {
            return Err(ImportError::Empty);
        }

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());
        let columns = Columns::from_header(reader.headers()?)?;

        let mut results = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = record.position().map_or(0, csv::Position::line);
            let name = field(&record, Some(columns.name)).to_string();

            let outcome = match validate(&record, &columns) {
                Ok(valid) => self.insert(valid).await,
                Err(error) => RowOutcome::Failed { error },
            };
            results.push(RowResult { row, name, outcome });
        }

        let imported = results.iter().filter(|r| r.is_imported()).count();
        tracing::info!(imported, rejected = results.len() - imported, "CSV import finished");
        Ok(results)
    }

    async fn insert(&mut self, row: ValidRow) -> RowOutcome {
        let category_id = match &row.category_slug {
            Some(slug) => self.category(slug).await,
            None => None,
        };
        let product = NewProduct {
            category_id,
            slug: Slug::from_name(&row.name),
            name: row.name,
            brand: row.brand,
            model: row.model,
            price: Some(row.price),
            status: row.status,
            description: None,
        };

        match insert_returning::<Product, _>(self.backend, "products", &product).await {
            Ok(stored) => RowOutcome::Imported { id: stored.id },
            Err(e) => RowOutcome::Failed {
                error: match e {
                    BackendError::Rejected { message, .. } => message,
                    other => other.to_string(),
                },
            },
        }
    }

    /// Category id for a slug. Unknown slugs and lookup failures import the
    /// row without a category.
    async fn category(&mut self, slug: &str) -> Option<CategoryId> {
        if let Some(cached) = self.categories.get(slug) {
            return *cached;
        }

        let query = Query::table("categories").select("id").eq("slug", slug);
        let id = match fetch_optional::<IdRow>(self.backend, &query).await {
            Ok(row) => row.map(|r| r.id),
            Err(e) => {
                tracing::warn!(slug, error = %e, "Category lookup failed, importing without category");
                None
            }
        };
        self.categories.insert(slug.to_string(), id);
        id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;
    use techspec_storefront::backend::{MemoryBackend, Op};

    fn backend_with_phones() -> (MemoryBackend, CategoryId) {
        let backend = MemoryBackend::new();
        let phones = CategoryId::random();
        backend.seed(
            "categories",
            vec![json!({"id": phones, "name": "Phones", "slug": "phones"})],
        );
        (backend, phones)
    }

    #[tokio::test]
    async fn test_imports_valid_rows_with_category() {
        let (backend, phones) = backend_with_phones();
        let csv = "name,brand,model,price,status,category_slug\n\
                   Pixel 9,Google,GA05843,799,,phones\n\
                   Kindle,Amazon,PW5,149.99,upcoming,\n";

        let results = ProductImporter::new(&backend).import(csv).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(RowResult::is_imported));
        assert_eq!(results[0].row, 2);
        assert_eq!(results[1].name, "Kindle");

        let rows = backend.rows("products");
        assert_eq!(rows[0]["slug"], "pixel-9");
        assert_eq!(rows[0]["status"], "active");
        assert_eq!(rows[0]["category_id"], json!(phones));
        assert_eq!(rows[1]["status"], "upcoming");
        assert!(rows[1]["category_id"].is_null());
    }

    #[tokio::test]
    async fn test_header_is_case_insensitive_and_unordered() {
        let (backend, _) = backend_with_phones();
        let csv = " Price , MODEL,Brand,Name\n10,M1,Acme,Widget\n";

        let results = ProductImporter::new(&backend).import(csv).await.unwrap();

        assert!(results[0].is_imported());
        assert_eq!(backend.rows("products")[0]["brand"], "Acme");
    }

    #[tokio::test]
    async fn test_rejected_rows_are_reported() {
        let (backend, _) = backend_with_phones();
        let csv = "name,brand,model,price,status\n\
                   ,Acme,M1,10,\n\
                   Widget,Acme,M2,cheap,\n\
                   Gadget,Acme,M3,5,retired\n\
                   Gizmo,Acme,M4,5,\n";

        let results = ProductImporter::new(&backend).import(csv).await.unwrap();

        let outcomes: Vec<_> = results.iter().map(|r| (r.row, r.is_imported())).collect();
        assert_eq!(outcomes, vec![(2, false), (3, false), (4, false), (5, true)]);
        assert_eq!(
            results[0].outcome,
            RowOutcome::Failed {
                error: "missing name".to_string()
            }
        );
        assert_eq!(backend.count(Op::Insert, "products"), 1);
    }

    #[tokio::test]
    async fn test_insert_failure_does_not_stop_later_rows() {
        let (backend, _) = backend_with_phones();
        let csv = "name,brand,model,price\nWidget,Acme,M1,1\nWidget,Acme,M2,2\nOther,Acme,M3,3\n";

        let results = ProductImporter::new(&backend).import(csv).await.unwrap();

        assert!(results[0].is_imported());
        assert!(matches!(&results[1].outcome, RowOutcome::Failed { error } if error.contains("duplicate")));
        assert!(results[2].is_imported());
    }

    #[tokio::test]
    async fn test_unknown_category_imports_without_one() {
        let (backend, _) = backend_with_phones();
        let csv = "name,brand,model,price,category_slug\nA,B,C,1,tablets\nD,E,F,2,tablets\n";

        let results = ProductImporter::new(&backend).import(csv).await.unwrap();

        assert!(results.iter().all(RowResult::is_imported));
        assert!(backend.rows("products")[0]["category_id"].is_null());
        assert_eq!(backend.count(Op::Select, "categories"), 1);
    }

    #[tokio::test]
    async fn test_empty_content_and_missing_header() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            ProductImporter::new(&backend).import("  \n").await,
            Err(ImportError::Empty)
        ));
        assert!(matches!(
            ProductImporter::new(&backend).import("name,brand,price\nA,B,1\n").await,
            Err(ImportError::MissingColumn("model"))
        ));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_result_serialization() {
        let id = ProductId::random();
        let ok = RowResult {
            row: 2,
            name: "A".into(),
            outcome: RowOutcome::Imported { id },
        };
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"row": 2, "name": "A", "id": id}));

        let failed = RowResult {
            row: 3,
            name: String::new(),
            outcome: RowOutcome::Failed {
                error: "missing name".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"row": 3, "name": "", "error": "missing name"})
        );
    }
}
