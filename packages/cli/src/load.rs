//! Fetching festivals with a progress bar.

use festival_map_catalog::{Catalog, SharedCatalog, load_into};
use festival_map_cli_utils::{MultiProgress, PageProgress};
use festival_map_festival_models::FestivalRecord;
use festival_map_server::ServerConfig;

/// Fetches every record of the configured source.
///
/// # Errors
///
/// Returns an error if the source cannot be built or the fetch fails.
pub async fn fetch(
    multi: &MultiProgress,
    config: &ServerConfig,
) -> Result<Vec<FestivalRecord>, Box<dyn std::error::Error>> {
    let progress = PageProgress::shared(multi, &format!("Fetching {}", config.source_id));
    let source = config.build_source(progress.clone())?;

    match source.fetch_all(&config.fetch_options).await {
        Ok(records) => {
            progress.finish(format!("{} festivals from {}", records.len(), source.name()));
            Ok(records)
        }
        Err(e) => {
            progress.finish_and_clear();
            Err(e.into())
        }
    }
}

/// Loads the configured source into a fresh catalog.
///
/// # Errors
///
/// Returns an error if the source cannot be built or the load fails.
pub async fn catalog(
    multi: &MultiProgress,
    config: &ServerConfig,
) -> Result<SharedCatalog, Box<dyn std::error::Error>> {
    let progress = PageProgress::shared(multi, &format!("Loading {}", config.source_id));
    let source = config.build_source(progress.clone())?;
    let catalog = Catalog::new().into_shared();

    match load_into(&catalog, source.as_ref(), &config.fetch_options).await {
        Ok(summary) => {
            progress.finish_and_clear();
            log::info!("{} festivals loaded from {}", summary.total, source.name());
            Ok(catalog)
        }
        Err(e) => {
            progress.finish_and_clear();
            Err(e.into())
        }
    }
}
