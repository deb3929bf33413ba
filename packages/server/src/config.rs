//! Server configuration read from the environment.

use std::sync::Arc;

use festival_map_server_models::EmbedOptions;
use festival_map_source::progress::ProgressCallback;
use festival_map_source::registry::{DEFAULT_SOURCE_ID, find_source};
use festival_map_source::source_def::DefinedSource;
use festival_map_source::transport::HttpTransport;
use festival_map_source::wordpress::WordPressEndpoint;
use festival_map_source::{
    DEFAULT_MAX_FESTIVALS, DEFAULT_PAGE_SIZE, FestivalSource, FetchOptions, SourceError,
};

/// Errors raised while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No source definition has this id.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// A numeric variable could not be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// `FESTIVAL_MAP_PAGE_SIZE` was set to zero.
    #[error("FESTIVAL_MAP_PAGE_SIZE must be at least 1")]
    ZeroPageSize,

    /// The source could not be built from the configuration.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Everything the server needs to know before it starts.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Id of the source definition to load from.
    pub source_id: String,
    /// Paging and limit options for every load.
    pub fetch_options: FetchOptions,
    /// WordPress admin-ajax URL.
    pub wp_ajax_url: Option<String>,
    /// WordPress nonce.
    pub wp_nonce: Option<String>,
    /// Embedding options served at `/api/embed`.
    pub embed: EmbedOptions,
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to bind to.
    pub port: u16,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] if a numeric variable is set
    /// but does not parse, or [`ConfigError::ZeroPageSize`] if the page
    /// size is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] if a numeric variable is set
    /// but does not parse, or [`ConfigError::ZeroPageSize`] if the page
    /// size is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let page_size = parse_number(&get, "FESTIVAL_MAP_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        let max_festivals =
            parse_number(&get, "FESTIVAL_MAP_MAX_FESTIVALS")?.unwrap_or(DEFAULT_MAX_FESTIVALS);
        let port = parse_number(&get, "PORT")?.unwrap_or(8080);

        let embed = EmbedOptions::default().with_max_festivals(max_festivals);
        if embed.max_festivals != max_festivals {
            log::warn!(
                "FESTIVAL_MAP_MAX_FESTIVALS={max_festivals} clamped to {}",
                embed.max_festivals
            );
        }

        Ok(Self {
            source_id: get("FESTIVAL_MAP_SOURCE").unwrap_or_else(|| DEFAULT_SOURCE_ID.to_string()),
            fetch_options: FetchOptions {
                page_size,
                limit: Some(embed.max_festivals),
                ..FetchOptions::default()
            },
            wp_ajax_url: get("FESTIVAL_MAP_WP_AJAX_URL"),
            wp_nonce: get("FESTIVAL_MAP_WP_NONCE"),
            embed,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }

    /// Builds the configured source over HTTP, reporting page progress to
    /// `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSource`] if no definition has the
    /// configured id, or [`ConfigError::Source`] if a WordPress source is
    /// missing its ajax URL or nonce.
    pub fn build_source(
        &self,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<Arc<dyn FestivalSource>, ConfigError> {
        let definition = find_source(&self.source_id)
            .ok_or_else(|| ConfigError::UnknownSource(self.source_id.clone()))?;

        let endpoint = if definition.needs_endpoint() {
            Some(WordPressEndpoint::new(
                self.wp_ajax_url.clone(),
                self.wp_nonce.clone(),
            )?)
        } else {
            None
        };

        let source = DefinedSource::new(definition, Arc::new(HttpTransport::new()), endpoint)?
            .with_progress(progress);
        Ok(Arc::new(source))
    }
}

fn parse_number<F, T>(get: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    get(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use festival_map_source::progress::null_progress;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.source_id, "culture_gouv");
        assert_eq!(config.fetch_options.page_size, 100);
        assert_eq!(config.fetch_options.limit, Some(8000));
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn numbers_are_parsed_and_clamped() {
        let config = config(&[
            ("FESTIVAL_MAP_PAGE_SIZE", "250"),
            ("FESTIVAL_MAP_MAX_FESTIVALS", "20"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.fetch_options.page_size, 250);
        assert_eq!(config.fetch_options.limit, Some(100));
        assert_eq!(config.embed.max_festivals, 100);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "PORT", .. }));
    }

    #[test]
    fn zero_page_size_is_rejected_at_startup() {
        let err = config(&[("FESTIVAL_MAP_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPageSize));
    }

    #[test]
    fn unknown_source_is_an_error() {
        let unknown = config(&[("FESTIVAL_MAP_SOURCE", "nope")]).unwrap();
        assert!(matches!(
            unknown.build_source(null_progress()),
            Err(ConfigError::UnknownSource(id)) if id == "nope"
        ));
    }

    #[test]
    fn wordpress_source_needs_credentials() {
        let missing = config(&[("FESTIVAL_MAP_SOURCE", "wordpress")]).unwrap();
        assert!(matches!(missing.build_source(null_progress()), Err(ConfigError::Source(_))));

        let complete = config(&[
            ("FESTIVAL_MAP_SOURCE", "wordpress"),
            ("FESTIVAL_MAP_WP_AJAX_URL", "https://example.fr/wp-admin/admin-ajax.php"),
            ("FESTIVAL_MAP_WP_NONCE", "abc123"),
        ])
        .unwrap();
        assert_eq!(complete.build_source(null_progress()).unwrap().id(), "wordpress");
    }
}
