#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line interface for the French music festivals map.
//!
//! ```text
//! festival_map sources
//! festival_map fetch [--source culture_gouv] [--page-size 100] [--limit 8000] [--output festivals.json]
//! festival_map list [--text rock] [--region PACA] [--department ..] [--genre ..] [--period Saison]
//! festival_map show <id>
//! festival_map map [filters] [--geojson]
//! festival_map serve
//! ```
//!
//! Running `festival_map` with no subcommand enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`festival_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod display;
mod interactive;
mod load;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use festival_map_festival_models::{FilterCriteria, Period};
use festival_map_geography_models::MapDefaults;
use festival_map_server::{ConfigError, ServerConfig};
use festival_map_server_models::ApiMapView;
use festival_map_source::registry::all_sources;

#[derive(Parser)]
#[command(name = "festival_map", about = "Browse French music festivals")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured festival sources
    Sources,
    /// Fetch every festival and write them as JSON
    Fetch {
        #[command(flatten)]
        source: SourceArgs,
        /// File to write to (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the festivals matching the filters
    List {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the detail panel of one festival
    Show {
        /// Festival id
        id: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print map markers and viewport for the matching festivals as JSON
    Map {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print a `GeoJSON` `FeatureCollection` instead
        #[arg(long)]
        geojson: bool,
    },
    /// Start the API server (configured through the environment)
    Serve,
}

/// Source selection, overriding the `FESTIVAL_MAP_*` environment.
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Source identifier (e.g., "`culture_gouv`")
    #[arg(long)]
    source: Option<String>,
    /// Records per page
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,
    /// Maximum number of festivals to fetch
    #[arg(long)]
    limit: Option<u64>,
}

impl SourceArgs {
    fn config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = ServerConfig::from_env()?;
        if let Some(source) = &self.source {
            config.source_id.clone_from(source);
        }
        if let Some(page_size) = self.page_size {
            config.fetch_options.page_size = page_size;
        }
        if let Some(limit) = self.limit {
            config.fetch_options.limit = Some(limit);
        }
        Ok(config)
    }
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Text matched against festival name and commune
    #[arg(long, short)]
    text: Option<String>,
    /// Exact region
    #[arg(long)]
    region: Option<String>,
    /// Exact department
    #[arg(long)]
    department: Option<String>,
    /// Part of the genre
    #[arg(long)]
    genre: Option<String>,
    /// Period: full label or its first word ("Avant-saison", "Saison",
    /// "Après-saison")
    #[arg(long, value_parser = parse_period)]
    period: Option<Period>,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            text: self.text.clone(),
            region: self.region.clone(),
            department: self.department.clone(),
            genre: self.genre.clone(),
            period: self.period,
        }
        .normalized()
    }
}

fn parse_period(value: &str) -> Result<Period, String> {
    let value = value.trim();
    Period::from_label(value)
        .or_else(|| {
            Period::ALL.iter().copied().find(|p| {
                p.as_ref()
                    .split(' ')
                    .next()
                    .is_some_and(|word| word.to_lowercase() == value.to_lowercase())
            })
        })
        .ok_or_else(|| {
            let labels: Vec<&str> = Period::ALL.iter().map(AsRef::as_ref).collect();
            format!("expected one of: {}", labels.join(", "))
        })
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = festival_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Sources => print_sources(),
        Commands::Fetch { source, output } => {
            let records = load::fetch(&multi, &source.config()?).await?;
            let json = serde_json::to_string_pretty(&records)?;

            if let Some(path) = output {
                std::fs::write(&path, json)?;
                log::info!("Wrote {} festivals to {}", records.len(), path.display());
            } else {
                println!("{json}");
            }
        }
        Commands::List { source, filter } => {
            let catalog = load::catalog(&multi, &source.config()?).await?;
            let mut catalog = catalog.write().await;
            catalog.apply_filter(filter.criteria());

            print!("{}", display::format_list(&catalog.filtered()));
        }
        Commands::Show { id, source } => {
            let catalog = load::catalog(&multi, &source.config()?).await?;
            let catalog = catalog.read().await;

            if let Some(record) = catalog.detail_by_key(&id) {
                print!("{}", display::format_detail(record));
            } else {
                eprintln!("Festival not found: {id}");
                std::process::exit(1);
            }
        }
        Commands::Map {
            source,
            filter,
            geojson,
        } => {
            let catalog = load::catalog(&multi, &source.config()?).await?;
            let catalog = catalog.read().await;

            let defaults = MapDefaults::default();
            let view = festival_map_map::present(catalog.query(&filter.criteria()), &defaults);
            if view.dropped > 0 {
                log::info!("{} festivals have no usable coordinates", view.dropped);
            }

            let json = if geojson {
                serde_json::to_string_pretty(&festival_map_map::to_feature_collection(&view))?
            } else {
                serde_json::to_string_pretty(&ApiMapView { view, defaults })?
            };
            println!("{json}");
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(festival_map_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

fn print_sources() {
    let sources = all_sources();

    println!("{:<20} NAME", "ID");
    println!("{}", "-".repeat(60));
    for source in &sources {
        println!("{:<20} {}", source.id(), source.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_accepts_label_or_first_word() {
        assert_eq!(
            parse_period("Saison (21 juin - 5 septembre)"),
            Ok(Period::Season)
        );
        assert_eq!(parse_period("avant-saison"), Ok(Period::PreSeason));
        assert_eq!(parse_period("Après-saison"), Ok(Period::PostSeason));
        assert!(parse_period("Hiver").is_err());
    }

    #[test]
    fn filter_flags_become_criteria() {
        let cli = Cli::try_parse_from([
            "festival_map",
            "list",
            "--text",
            " rock ",
            "--region",
            "PACA",
            "--period",
            "saison",
        ])
        .unwrap();

        let Some(Commands::List { filter, .. }) = cli.command else {
            panic!("expected list");
        };
        let criteria = filter.criteria();
        assert_eq!(criteria.text.as_deref(), Some("rock"));
        assert_eq!(criteria.region.as_deref(), Some("PACA"));
        assert_eq!(criteria.period, Some(Period::Season));
    }

    #[test]
    fn show_takes_an_id() {
        let cli = Cli::try_parse_from(["festival_map", "show", "42", "--limit", "10"]).unwrap();
        let Some(Commands::Show { id, source }) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(id, "42");
        assert_eq!(source.limit, Some(10));
    }

    #[test]
    fn page_size_flag_must_be_positive() {
        assert!(Cli::try_parse_from(["festival_map", "list", "--page-size", "0"]).is_err());

        let cli = Cli::try_parse_from(["festival_map", "list", "--page-size", "50"]).unwrap();
        let Some(Commands::List { source, .. }) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(source.page_size, Some(50));
    }
}
