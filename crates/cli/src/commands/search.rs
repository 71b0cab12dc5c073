//! Interactive live search.
//!
//! Each line read from stdin is one keystroke's worth of input. Lines that
//! arrive faster than the debounce window collapse into one query, and
//! responses to superseded queries are never shown.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use techspec_storefront::backend::{Backend, RestBackend};
use techspec_storefront::catalog::{Catalog, ProductFilter, SpecTerm};
use techspec_storefront::search::{LiveSearch, SearchResults};

use super::{CommandError, Key, backend_config};

/// How long to wait for the last query after stdin closes.
const FINAL_RESULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Filters applied to every typed query.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub brand: Option<String>,
    pub category: Option<String>,
    /// Raw `key:value` or bare terms.
    pub spec: Vec<String>,
    pub debounce: Duration,
}

impl SearchOptions {
    /// The listing filter for one line of input.
    #[must_use]
    pub fn filter_for(&self, text: &str) -> ProductFilter {
        ProductFilter {
            query: Some(text.trim().to_string()),
            brand: self.brand.clone(),
            category: self.category.clone(),
            spec: self.spec.iter().filter_map(|raw| SpecTerm::parse(raw)).collect(),
            ..ProductFilter::default()
        }
    }
}

fn log_results(request: u64, results: &SearchResults) {
    info!(
        request,
        query = results.filter.query.as_deref().unwrap_or_default(),
        count = results.products.len(),
        "Results"
    );
    for product in &results.products {
        let price = product
            .price
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        info!("  {} {} ({}) {}", product.brand, product.name, product.slug, price);
    }
}

/// Run the search loop against the configured backend until stdin closes.
///
/// # Errors
///
/// Returns an error if configuration is missing, the debounce window is out
/// of range or stdin cannot be read.
pub async fn interactive(options: SearchOptions) -> Result<(), CommandError> {
    let backend: Arc<dyn Backend> = Arc::new(RestBackend::new(backend_config(Key::Anon)?));
    run(Catalog::new(backend), &options, tokio::io::stdin()).await
}

/// Feed lines from `input` into a live search and log every applied result.
///
/// # Errors
///
/// Returns an error if the debounce window is out of range or `input`
/// cannot be read.
pub async fn run<R>(catalog: Catalog, options: &SearchOptions, input: R) -> Result<(), CommandError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let search = LiveSearch::spawn(catalog, options.debounce)?;
    let mut results = search.subscribe();

    // Ends once every in-flight query has finished and the search is dropped.
    let printer = tokio::spawn(async move {
        let mut shown = 0;
        while results.changed().await.is_ok() {
            let (request, current) = results.borrow_and_update().clone();
            log_results(request, &current);
            shown += 1;
        }
        shown
    });

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        search.input(options.filter_for(&line));
    }
    drop(search);

    match tokio::time::timeout(FINAL_RESULT_TIMEOUT, printer).await {
        Ok(Ok(shown)) => tracing::debug!(shown, "Search finished"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Result printer failed"),
        Err(_) => tracing::warn!("Gave up waiting for the last search result"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use techspec_storefront::backend::{MemoryBackend, Op};
    use techspec_storefront::search::DEFAULT_DEBOUNCE;

    fn options() -> SearchOptions {
        SearchOptions {
            debounce: DEFAULT_DEBOUNCE,
            ..SearchOptions::default()
        }
    }

    #[test]
    fn test_filter_for_applies_options() {
        let options = SearchOptions {
            brand: Some("goo".to_string()),
            spec: vec!["network:5G".to_string(), String::new()],
            ..options()
        };
        let filter = options.filter_for("  pixel ");
        assert_eq!(filter.query.as_deref(), Some("pixel"));
        assert_eq!(filter.brand.as_deref(), Some("goo"));
        assert_eq!(filter.spec.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_lines_issues_one_query() {
        let backend = MemoryBackend::new();
        let catalog = Catalog::new(Arc::new(backend.clone()));

        run(catalog, &options(), &b"p\npi\npix\n"[..]).await.unwrap();

        assert_eq!(backend.count(Op::Select, "products"), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_debounce_is_rejected() {
        let backend = MemoryBackend::new();
        let options = SearchOptions {
            debounce: Duration::from_millis(50),
            ..SearchOptions::default()
        };
        let err = run(Catalog::new(Arc::new(backend)), &options, &b""[..])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Search(_)));
    }
}
