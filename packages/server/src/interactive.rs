//! Interactive mode for the server.
//!
//! Prompts the user for the festival source, bind address, and port
//! before starting the server.

use dialoguer::{Confirm, Input, Select};
use festival_map_source::registry::{DEFAULT_SOURCE_ID, all_sources};

use crate::ServerError;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks the user for a source, bind address, and port, sets the
/// corresponding environment variables (`FESTIVAL_MAP_SOURCE`,
/// `BIND_ADDR`, `PORT`), and delegates to [`super::run_server`]. A
/// WordPress source also prompts for its ajax URL and nonce.
///
/// # Errors
///
/// Returns a [`ServerError`] if the configuration is invalid or the
/// underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Festival Map Server");
    println!();

    let sources = all_sources();
    let labels: Vec<&str> = sources.iter().map(|s| s.name()).collect();
    let default = sources
        .iter()
        .position(|s| s.id() == DEFAULT_SOURCE_ID)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Festival source")
        .items(&labels)
        .default(default)
        .interact()
        .unwrap_or(default);
    let source = &sources[selection];

    let credentials = if source.needs_endpoint() {
        let ajax_url: String = Input::new()
            .with_prompt("WordPress ajax URL")
            .interact_text()
            .unwrap_or_default();
        let nonce: String = Input::new()
            .with_prompt("WordPress nonce")
            .interact_text()
            .unwrap_or_default();
        Some((ajax_url, nonce))
    } else {
        None
    };

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("FESTIVAL_MAP_SOURCE", source.id());
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        if let Some((ajax_url, nonce)) = &credentials {
            std::env::set_var("FESTIVAL_MAP_WP_AJAX_URL", ajax_url);
            std::env::set_var("FESTIVAL_MAP_WP_NONCE", nonce);
        }
    }

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {bind_addr}:{port_str} with {}?",
            source.name()
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
