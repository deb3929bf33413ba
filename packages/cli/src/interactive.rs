//! Interactive mode for the festival map CLI.
//!
//! Lets the user pick a tool, then guides them through its options with
//! `dialoguer` prompts.

use dialoguer::{Confirm, Input, Select};
use festival_map_cli_utils::MultiProgress;
use festival_map_festival_models::{FilterCriteria, Period};
use festival_map_filter::filter_options;
use festival_map_server::ServerConfig;

use crate::{display, load, print_sources};

const ANY: &str = "(toutes)";

/// Top-level tool selection.
enum Tool {
    Browse,
    Fetch,
    Server,
    Sources,
}

impl Tool {
    const ALL: &[Self] = &[Self::Browse, Self::Fetch, Self::Server, Self::Sources];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Browse => "Browse festivals",
            Self::Fetch => "Fetch festivals to a JSON file",
            Self::Server => "Start server",
            Self::Sources => "List sources",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails, the configuration is invalid, or
/// the selected tool fails.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Festival Map");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Browse => browse(multi, &ServerConfig::from_env()?).await?,
        Tool::Fetch => fetch(multi, &ServerConfig::from_env()?).await?,
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(festival_map_server::interactive::run())
            })
            .await??;
        }
        Tool::Sources => print_sources(),
    }

    Ok(())
}

/// Loads the festivals, asks for filters, prints the results, and then
/// shows details of the festivals the user picks.
async fn browse(
    multi: &MultiProgress,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load::catalog(multi, config).await?;
    let mut catalog = catalog.write().await;
    let options = filter_options(catalog.full());

    let text: String = Input::new()
        .with_prompt("Search (name or commune, empty for all)")
        .allow_empty(true)
        .interact_text()?;
    let region = pick("Region", &options.regions)?;
    let department = pick("Department", &options.departments)?;
    let periods: Vec<String> = Period::ALL.iter().map(ToString::to_string).collect();
    let period = pick("Period", &periods)?.and_then(|label| Period::from_label(&label));

    let criteria = FilterCriteria {
        text: Some(text),
        region,
        department,
        genre: None,
        period,
    };
    catalog.apply_filter(criteria);

    let filtered = catalog.filtered();
    print!("{}", display::format_list(&filtered));
    if filtered.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = filtered.iter().map(|r| r.display_name()).collect();
    loop {
        let Some(idx) = Select::new()
            .with_prompt("Show details (Esc to quit)")
            .items(&names)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        println!();
        print!("{}", display::format_detail(filtered[idx]));
        println!();
    }
}

/// Prompts for one value of a filter control, `None` meaning any.
fn pick(prompt: &str, values: &[String]) -> Result<Option<String>, dialoguer::Error> {
    if values.is_empty() {
        return Ok(None);
    }

    let items: Vec<&str> = std::iter::once(ANY)
        .chain(values.iter().map(String::as_str))
        .collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok((idx > 0).then(|| values[idx - 1].clone()))
}

/// Asks for an output path and writes every fetched festival to it.
async fn fetch(
    multi: &MultiProgress,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let path: String = Input::new()
        .with_prompt("Output file")
        .default("festivals.json".to_string())
        .interact_text()?;

    if !Confirm::new()
        .with_prompt(format!("Fetch from {} into {path}?", config.source_id))
        .default(true)
        .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let records = load::fetch(multi, config).await?;
    std::fs::write(&path, serde_json::to_string_pretty(&records)?)?;
    log::info!("Wrote {} festivals to {path}", records.len());

    Ok(())
}
