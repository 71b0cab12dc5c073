//! Live product search: debounced input, generation-guarded results.
//!
//! Keystrokes go into a [`Debouncer`]; only the value that stays unchanged
//! for the quiet window issues a query. Queries run concurrently, so each
//! one takes a [`Ticket`] from the [`RequestGate`] and its response is
//! published only if no newer request has been issued since.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use techspec_core::Product;

use crate::catalog::{Catalog, ProductFilter};

/// Default quiet window before a search input is considered settled.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Accepted quiet windows.
pub const DEBOUNCE_RANGE: RangeInclusive<Duration> =
    Duration::from_millis(300)..=Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("debounce window must be between 300 and 500 ms, got {0:?}")]
    InvalidDebounce(Duration),
}

/// Emits an input only once no newer input arrived for `window`.
pub struct Debouncer<T> {
    input: mpsc::UnboundedReceiver<T>,
    window: Duration,
}

impl<T> Debouncer<T> {
    /// # Errors
    ///
    /// Returns `SearchError::InvalidDebounce` for a window outside
    /// [`DEBOUNCE_RANGE`].
    pub fn new(input: mpsc::UnboundedReceiver<T>, window: Duration) -> Result<Self, SearchError> {
        if !DEBOUNCE_RANGE.contains(&window) {
            return Err(SearchError::InvalidDebounce(window));
        }
        Ok(Self { input, window })
    }

    /// The next settled value, or `None` once the input side is closed.
    ///
    /// Each new input restarts the window and replaces the pending value.
    /// A value still pending when the input closes is emitted right away.
    pub async fn next(&mut self) -> Option<T> {
        let mut pending = self.input.recv().await?;
        loop {
            tokio::select! {
                next = self.input.recv() => match next {
                    Some(value) => pending = value,
                    None => return Some(pending),
                },
                () = tokio::time::sleep(self.window) => return Some(pending),
            }
        }
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Monotonic request generations in front of a `watch` channel.
///
/// A response is applied only if its ticket is the newest one issued and
/// nothing newer has been applied; everything else is dropped.
pub struct RequestGate<T> {
    issued: AtomicU64,
    applied: watch::Sender<(u64, T)>,
}

impl<T> RequestGate<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: watch::Sender::new((0, initial)),
        }
    }

    /// Issue the next ticket. Tickets start at 1.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Apply `value` for `ticket`. Returns whether it was applied.
    pub fn complete(&self, ticket: Ticket, value: T) -> bool {
        self.applied.send_if_modified(|(applied, current)| {
            if ticket.0 != self.issued.load(Ordering::SeqCst) || ticket.0 <= *applied {
                return false;
            }
            *applied = ticket.0;
            *current = value;
            true
        })
    }

    /// Receiver of `(request id, value)` for every applied response.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<(u64, T)> {
        self.applied.subscribe()
    }
}

/// Results of the newest settled search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub filter: ProductFilter,
    pub products: Vec<Product>,
}

/// Debounced, stale-safe search over the catalog.
///
/// Dropping the `LiveSearch` closes the input; the driver task then exits.
/// Requests already in flight run to completion and are discarded if stale.
pub struct LiveSearch {
    input: mpsc::UnboundedSender<ProductFilter>,
    gate: Arc<RequestGate<SearchResults>>,
}

impl LiveSearch {
    /// Start the driver task.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidDebounce` for a window outside
    /// [`DEBOUNCE_RANGE`].
    pub fn spawn(catalog: Catalog, window: Duration) -> Result<Self, SearchError> {
        let (input, rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(rx, window)?;
        let gate = Arc::new(RequestGate::new(SearchResults::default()));

        let driver_gate = Arc::clone(&gate);
        tokio::spawn(async move {
            while let Some(filter) = debouncer.next().await {
                let ticket = driver_gate.begin();
                let catalog = catalog.clone();
                let gate = Arc::clone(&driver_gate);
                tokio::spawn(async move {
                    match catalog.list_products(&filter).await {
                        Ok(products) => {
                            if !gate.complete(ticket, SearchResults { filter, products }) {
                                debug!(request = ticket.id(), "Discarded stale search response");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, request = ticket.id(), "Live search query failed");
                        }
                    }
                });
            }
        });

        Ok(Self { input, gate })
    }

    /// Feed the current filter state (typically on every keystroke).
    pub fn input(&self, filter: ProductFilter) {
        if self.input.send(filter).is_err() {
            debug!("Live search driver stopped");
        }
    }

    /// Convenience for free-text input.
    pub fn input_text(&self, text: &str) {
        self.input(ProductFilter {
            query: Some(text.to_string()),
            ..ProductFilter::default()
        });
    }

    /// Receiver of `(request id, results)`, updated once per applied response.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<(u64, SearchResults)> {
        self.gate.subscribe()
    }
}
