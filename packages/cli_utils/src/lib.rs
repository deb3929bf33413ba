#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the festival map CLI.
//!
//! Festival sources report progress in requests, not records: the
//! open-data fetcher first asks for the hit count, then downloads
//! `ceil(total / page_size)` pages concurrently, while the WordPress
//! fetcher issues exactly one request. [`PageProgress`] draws those
//! updates with `indicatif`, and [`init_logger`] routes `log` output
//! through the same [`MultiProgress`] so log lines do not tear the bar.

use std::sync::Arc;
use std::time::Duration;

use festival_map_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const COUNTING_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const PAGES_TEMPLATE: &str = "  {msg} {wide_bar:.cyan/dim} {pos}/{len} pages {percent}% [{eta}]";

/// Page counter for one festival load.
///
/// Shows a spinner labelled "counting festivals" until the fetcher knows
/// how many pages it will request. Multi-page loads then switch to a bar;
/// single-request loads keep the spinner, since a one-step bar only ever
/// shows 0% or 100%.
pub struct PageProgress {
    bar: ProgressBar,
    label: String,
}

impl PageProgress {
    /// Adds a counter labelled `label` (e.g. `"Fetching culture_gouv"`) to
    /// `multi`.
    #[must_use]
    pub fn start(multi: &MultiProgress, label: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(COUNTING_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("{label} (counting festivals)"));

        Self {
            bar,
            label: label.to_string(),
        }
    }

    /// Same as [`Self::start`], ready to hand to a source.
    #[must_use]
    pub fn shared(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
        Arc::new(Self::start(multi, label))
    }
}

impl ProgressCallback for PageProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message(self.label.clone());

        if total > 1 {
            log::debug!("{}: {total} pages to fetch", self.label);
            self.bar.set_style(
                ProgressStyle::with_template(PAGES_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
        }
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Installs `pretty_env_logger` (filtered by `RUST_LOG`) behind
/// `indicatif-log-bridge`, which suspends page counters while a log line
/// is printed.
///
/// Returns the [`MultiProgress`] every [`PageProgress`] must be added to.
/// A second call leaves the first logger in place.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    multi
}
