//! Blocking HTTP client for the portal content API.
//!
//! One method per backend endpoint; every response body goes through the
//! normalizer before callers see it. A failed request is always an error,
//! never a silent substitution of placeholder content, so callers can tell
//! "backend down" apart from "zero results".

use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

use crate::models::{ActivityPage, BookIntroduction, CatalogItem, IntroductionPage};
use crate::normalize::{self, NormalizeError};
use crate::PortalConfig;

const HTTP_TIMEOUT_SECS: u64 = 30;
const HTTP_MAX_RETRIES: u64 = 1;
const HTTP_USER_AGENT: &str = "LibraryPortal/0.1";

/// Frappe method path all catalog/content endpoints hang off.
const LIBRARY_VIEW_METHOD: &str = "/api/method/erp.api.erp_sis.library_view";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not build http client: {0}")]
    BuildClient(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("response from {url} was not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Criteria for the "you may also like" shelf on the detail page.
#[derive(Debug, Clone, Default)]
pub struct RelatedQuery {
    pub exclude_id: String,
    pub category: String,
    pub series_name: String,
    pub document_type: String,
    pub authors: Vec<String>,
    pub limit: usize,
}

pub struct PortalClient {
    client: Client,
    config: PortalConfig,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::BuildClient)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Full catalog listing, paged by the backend.
    pub fn list_titles(&self, limit: usize, page: usize) -> Result<Vec<CatalogItem>, ApiError> {
        let url = self.method_url(
            "list_public_titles",
            &[("limit", limit.to_string()), ("page", page.to_string())],
        );
        Ok(normalize::catalog_items(&self.get_json(&url)?)?)
    }

    /// Detail lookup; the backend owns the slug-to-record mapping.
    pub fn get_title_by_slug(&self, slug: &str) -> Result<CatalogItem, ApiError> {
        let url = self.method_url("get_public_title_by_slug", &[("slug", slug.to_string())]);
        Ok(normalize::catalog_item(&self.get_json(&url)?)?)
    }

    pub fn list_featured_titles(&self, limit: usize) -> Result<Vec<CatalogItem>, ApiError> {
        let url = self.method_url("list_featured_titles", &[("limit", limit.to_string())]);
        Ok(normalize::catalog_items(&self.get_json(&url)?)?)
    }

    pub fn list_new_titles(&self, limit: usize) -> Result<Vec<CatalogItem>, ApiError> {
        let url = self.method_url("list_new_titles", &[("limit", limit.to_string())]);
        Ok(normalize::catalog_items(&self.get_json(&url)?)?)
    }

    pub fn list_audio_titles(&self, limit: usize) -> Result<Vec<CatalogItem>, ApiError> {
        let url = self.method_url("list_audio_titles", &[("limit", limit.to_string())]);
        Ok(normalize::catalog_items(&self.get_json(&url)?)?)
    }

    pub fn list_related_titles(&self, related: &RelatedQuery) -> Result<Vec<CatalogItem>, ApiError> {
        let url = self.method_url(
            "list_related_titles",
            &[
                ("exclude_id", related.exclude_id.clone()),
                ("category", related.category.clone()),
                ("series_name", related.series_name.clone()),
                ("document_type", related.document_type.clone()),
                (
                    "authors",
                    serde_json::to_string(&related.authors).unwrap_or_default(),
                ),
                ("limit", related.limit.to_string()),
            ],
        );
        Ok(normalize::catalog_items(&self.get_json(&url)?)?)
    }

    /// Published activities/events, newest first as the backend orders them.
    pub fn list_events(&self, page: usize, limit: usize) -> Result<ActivityPage, ApiError> {
        let url = self.method_url(
            "list_public_events",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        );
        Ok(normalize::activity_page(&self.get_json(&url)?)?)
    }

    /// Published book-introduction articles.
    pub fn list_book_introductions(
        &self,
        page: usize,
        limit: usize,
        featured_only: bool,
    ) -> Result<IntroductionPage, ApiError> {
        let url = self.method_url(
            "list_public_book_introductions",
            &[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("featured_only", (if featured_only { "1" } else { "0" }).to_string()),
            ],
        );
        Ok(normalize::introduction_page(&self.get_json(&url)?)?)
    }

    pub fn get_book_introduction_by_slug(&self, slug: &str) -> Result<BookIntroduction, ApiError> {
        let url = self.method_url(
            "get_public_book_introduction_by_slug",
            &[("slug", slug.to_string())],
        );
        Ok(normalize::introduction(&self.get_json(&url)?)?)
    }

    pub fn list_featured_introductions(&self, limit: usize) -> Result<IntroductionPage, ApiError> {
        self.list_book_introductions(1, limit, true)
    }

    fn method_url(&self, method: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}.{}",
            self.config.api_url, LIBRARY_VIEW_METHOD, method
        );

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        url
    }

    fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        log::debug!("portal http get url={}", url);

        let mut attempt: u64 = 0;
        loop {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .header(reqwest::header::USER_AGENT, HTTP_USER_AGENT)
                .send();

            let response = match response {
                Ok(value) => value,
                Err(source) => {
                    log::warn!(
                        "portal http transport_error url={} attempt={}",
                        url,
                        attempt + 1
                    );
                    if attempt < HTTP_MAX_RETRIES {
                        std::thread::sleep(Duration::from_millis(350 * (attempt + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(ApiError::Transport {
                        url: url.to_string(),
                        source,
                    });
                }
            };

            let status = response.status();
            if status.is_success() {
                return response.json::<Value>().map_err(|source| ApiError::Decode {
                    url: url.to_string(),
                    source,
                });
            }

            log::warn!(
                "portal http status url={} status={} attempt={}",
                url,
                status,
                attempt + 1
            );

            if (status.as_u16() == 429 || status.is_server_error()) && attempt < HTTP_MAX_RETRIES {
                let retry_after_ms = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(|value| value * 1000)
                    .unwrap_or(350 * (attempt + 1));
                std::thread::sleep(Duration::from_millis(retry_after_ms.min(4_000)));
                attempt += 1;
                continue;
            }

            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PortalClient, RelatedQuery};
    use crate::PortalConfig;

    fn client() -> PortalClient {
        let config = PortalConfig::new("https://admin.example/", "https://files.example");
        PortalClient::new(config).expect("client should build")
    }

    #[test]
    fn method_url_joins_host_method_and_params() {
        let url = client().method_url(
            "list_public_titles",
            &[("limit", "20".to_string()), ("page", "2".to_string())],
        );
        assert_eq!(
            url,
            "https://admin.example/api/method/erp.api.erp_sis.library_view.list_public_titles?limit=20&page=2"
        );
    }

    #[test]
    fn method_url_without_params_has_no_query_string() {
        let url = client().method_url("list_public_titles", &[]);
        assert!(!url.contains('?'));
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let url = client().method_url(
            "get_public_title_by_slug",
            &[("slug", "dế mèn".to_string())],
        );
        assert!(url.ends_with("slug=d%E1%BA%BF%20m%C3%A8n"));
    }

    #[test]
    fn related_query_serializes_authors_as_json_array() {
        let related = RelatedQuery {
            authors: vec!["Tô Hoài".to_string()],
            limit: 10,
            ..RelatedQuery::default()
        };
        let encoded = serde_json::to_string(&related.authors).unwrap();
        assert_eq!(encoded, r#"["Tô Hoài"]"#);
    }

    #[test]
    #[ignore = "network probe for manual debugging"]
    fn live_endpoint_probe() {
        let config = PortalConfig::from_env().expect("set PORTAL_API_URL and PORTAL_FILES_URL");
        let client = PortalClient::new(config).expect("client should build");
        let titles = client.list_titles(5, 1);
        println!("probe list_titles -> {:?}", titles.map(|items| items.len()));
    }
}
