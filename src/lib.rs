//! Data layer for the school library web portal.
//!
//! The portal front-end renders a catalog, book detail pages, an
//! activities gallery, and book-introduction articles, all sourced from a
//! remote content API. This crate owns everything between the wire and the
//! rendering code: fetching ([`api::PortalClient`]), normalizing the
//! backend's historical payload shapes ([`normalize`]), resolving image
//! paths ([`images`]), deriving link slugs ([`slug`]), and querying the
//! fetched catalog in memory ([`catalog`]).

use std::env;

pub mod api;
pub mod catalog;
pub mod images;
pub mod models;
pub mod normalize;
pub mod slug;

pub use api::{ApiError, PortalClient, RelatedQuery};
pub use catalog::{CatalogError, CatalogPage, CatalogQuery, SortKey};
pub use images::ImageResolver;
pub use models::CatalogItem;
pub use normalize::NormalizeError;
pub use slug::create_slug;

const ENV_API_URL: &str = "PORTAL_API_URL";
const ENV_FILES_URL: &str = "PORTAL_FILES_URL";
const ENV_REMOTE_PREFIXES: &str = "PORTAL_REMOTE_PREFIXES";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Per-deployment configuration.
///
/// Every base URL is injected here exactly once; nothing else in the crate
/// carries a compiled-in host name.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Root of the content API, without a trailing slash.
    pub api_url: String,
    /// Base URL for server-relative upload paths, without a trailing slash.
    pub files_url: String,
    /// First path segments that mark a `/`-prefixed image path as a server
    /// upload rather than a bundled asset.
    pub remote_prefixes: Vec<String>,
}

impl PortalConfig {
    pub fn new(api_url: &str, files_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            files_url: files_url.trim_end_matches('/').to_string(),
            remote_prefixes: images::DEFAULT_REMOTE_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// `PORTAL_API_URL` and `PORTAL_FILES_URL` are required; there is no
    /// fallback URL. `PORTAL_REMOTE_PREFIXES` optionally overrides the
    /// upload-path prefixes as a comma-separated list.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = required_var(ENV_API_URL)?;
        let files_url = required_var(ENV_FILES_URL)?;
        let mut config = Self::new(&api_url, &files_url);

        if let Ok(raw) = env::var(ENV_REMOTE_PREFIXES) {
            let prefixes: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .map(str::to_string)
                .collect();
            if !prefixes.is_empty() {
                config.remote_prefixes = prefixes;
            }
        }

        Ok(config)
    }

    /// Build the image resolver for this deployment.
    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(&self.files_url, self.remote_prefixes.clone())
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}
