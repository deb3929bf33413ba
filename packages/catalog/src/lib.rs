#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loaded festival state.
//!
//! [`Catalog`] owns the full collection, the active filter, and the
//! filtered view derived from them. Reloads are tagged with a generation
//! [`LoadTicket`]; a load that finishes after a newer one started is
//! discarded instead of overwriting fresher data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use festival_map_festival_models::{FestivalId, FestivalRecord, FilterCriteria};
use festival_map_source::{FestivalSource, FetchOptions, SourceError};
use serde::Serialize;
use tokio::sync::RwLock;

/// A catalog shared between request handlers.
pub type SharedCatalog = Arc<RwLock<Catalog>>;

/// Errors raised while loading into a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A newer load started before this one completed.
    #[error("Load {ticket} is stale (current generation is {current})")]
    StaleLoad {
        /// Generation of the discarded load.
        ticket: u64,
        /// Generation that superseded it.
        current: u64,
    },

    /// The source failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Proof that a load was started, tagged with its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Generation this load belongs to.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Outcome of a completed load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    /// Generation that was applied.
    pub generation: u64,
    /// Records in the full collection.
    pub total: usize,
    /// Records passing the active filter.
    pub filtered: usize,
    /// When the load was applied.
    pub loaded_at: DateTime<Utc>,
}

/// Point-in-time view of the catalog for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    /// Records in the full collection.
    pub total: usize,
    /// Records passing the active filter.
    pub filtered: usize,
    /// Latest generation started.
    pub generation: u64,
    /// When the current collection was loaded.
    pub loaded_at: Option<DateTime<Utc>>,
    /// Message of the last failed load, cleared by a successful one.
    pub last_error: Option<String>,
}

/// The loaded festivals and the active filter.
#[derive(Debug, Default)]
pub struct Catalog {
    full: Vec<FestivalRecord>,
    criteria: FilterCriteria,
    filtered: Vec<usize>,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the catalog for sharing across tasks.
    #[must_use]
    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(RwLock::new(self))
    }

    /// Starts a new load generation.
    pub const fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Returns `true` if no newer load has started since `ticket`.
    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Replaces the collection with `records` and re-applies the active
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::StaleLoad`] and leaves the catalog
    /// untouched if a newer load has started.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        records: Vec<FestivalRecord>,
    ) -> Result<LoadSummary, CatalogError> {
        if !self.is_current(ticket) {
            log::info!(
                "Discarding stale load {} ({} records), generation is now {}",
                ticket.generation,
                records.len(),
                self.generation
            );
            return Err(CatalogError::StaleLoad {
                ticket: ticket.generation,
                current: self.generation,
            });
        }

        let loaded_at = Utc::now();
        self.full = records;
        self.filtered = festival_map_filter::apply_indices(&self.full, &self.criteria);
        self.loaded_at = Some(loaded_at);
        self.last_error = None;

        log::info!(
            "Loaded {} festivals ({} match the active filter)",
            self.full.len(),
            self.filtered.len()
        );

        Ok(LoadSummary {
            generation: ticket.generation,
            total: self.full.len(),
            filtered: self.filtered.len(),
            loaded_at,
        })
    }

    /// Records a failed load. Ignored when the ticket is stale.
    ///
    /// The previous collection is kept.
    pub fn fail_load(&mut self, ticket: LoadTicket, error: &SourceError) {
        if self.is_current(ticket) {
            log::error!("Festival load failed: {error}");
            self.last_error = Some(error.to_string());
        } else {
            log::info!(
                "Ignoring failure of stale load {}: {error}",
                ticket.generation
            );
        }
    }

    /// Sets the active filter and returns how many records pass it.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) -> usize {
        self.criteria = criteria.normalized();
        self.filtered = festival_map_filter::apply_indices(&self.full, &self.criteria);
        self.filtered.len()
    }

    /// The active filter.
    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Every loaded record.
    #[must_use]
    pub fn full(&self) -> &[FestivalRecord] {
        &self.full
    }

    /// Records passing the active filter, in load order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&FestivalRecord> {
        self.filtered.iter().map(|&i| &self.full[i]).collect()
    }

    /// Records passing `criteria`, leaving the active filter untouched.
    #[must_use]
    pub fn query(&self, criteria: &FilterCriteria) -> Vec<&FestivalRecord> {
        festival_map_filter::apply(&self.full, criteria)
    }

    /// Looks a record up by id in the full collection.
    ///
    /// Records hidden by the active filter are still found.
    #[must_use]
    pub fn detail(&self, id: &FestivalId) -> Option<&FestivalRecord> {
        self.full.iter().find(|r| &r.id == id)
    }

    /// Looks a record up by the textual form of its id.
    #[must_use]
    pub fn detail_by_key(&self, key: &str) -> Option<&FestivalRecord> {
        self.full.iter().find(|r| r.id.matches(key))
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        CatalogStatus {
            total: self.full.len(),
            filtered: self.filtered.len(),
            generation: self.generation,
            loaded_at: self.loaded_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// Fetches from `source` and applies the result to `catalog`.
///
/// The lock is only taken to start and to finish the load, never while
/// the fetch is in flight.
///
/// # Errors
///
/// Returns [`CatalogError::Source`] if the fetch fails and
/// [`CatalogError::StaleLoad`] if a newer load started meanwhile.
pub async fn load_into(
    catalog: &SharedCatalog,
    source: &dyn FestivalSource,
    options: &FetchOptions,
) -> Result<LoadSummary, CatalogError> {
    let ticket = catalog.write().await.begin_load();
    log::info!(
        "Loading festivals from {} (generation {})",
        source.name(),
        ticket.generation
    );

    match source.fetch_all(options).await {
        Ok(records) => catalog.write().await.complete_load(ticket, records),
        Err(e) => {
            catalog.write().await.fail_load(ticket, &e);
            Err(e.into())
        }
    }
}
