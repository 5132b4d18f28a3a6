//! Thin request/response wrapper around the two remote endpoints.

use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{PrimaryEntity, SecondaryEntity},
    error::{ApiErrorBody, GatewayError},
    protocol::{
        ListRepositoriesQuery, ListRepositoriesResponse, RepositorySort, SearchUsersQuery,
        SearchUsersResponse,
    },
};
use tracing::debug;
use url::Url;

/// Most results the search endpoint will ever enumerate, whatever `total_count` says.
pub const HARD_CAP: u64 = 1000;
/// Most secondary entities fetched for one selection.
pub const SECONDARY_FETCH_CAP: u32 = 100;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<PrimaryEntity>,
    pub total_count: u64,
}

/// Every call is a single best-effort attempt: no retries, no caching.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    async fn search_primary(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, GatewayError>;

    async fn fetch_secondary(&self, login: &str) -> Result<Vec<SecondaryEntity>, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub user_agent: String,
    pub token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".into(),
            user_agent: concat!("account-explorer/", env!("CARGO_PKG_VERSION")).into(),
            token: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

pub struct HttpEntityGateway {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpEntityGateway {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .with_context(|| format!("invalid api base url '{}'", config.base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("api base url '{base_url}' cannot carry a path"));
        }

        let http = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            http,
            base_url,
            token: config.token.filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::transport(self.base_url.as_str(), "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T, Q>(&self, url: Url, query: &Q) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let endpoint = url.path().to_string();
        let mut request = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, GITHUB_MEDIA_TYPE);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::transport(&endpoint, err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::transport(&endpoint, err.to_string()))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|body| body.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            return Err(GatewayError::status(&endpoint, status.as_u16(), reason));
        }

        serde_json::from_str(&body).map_err(|err| GatewayError::decode(&endpoint, err.to_string()))
    }
}

#[async_trait]
impl EntityGateway for HttpEntityGateway {
    async fn search_primary(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, GatewayError> {
        let url = self.endpoint(&["search", "users"])?;
        let response: SearchUsersResponse = self
            .get_json(
                url,
                &SearchUsersQuery {
                    q: query,
                    per_page: page_size,
                    page,
                },
            )
            .await?;
        debug!(
            query,
            page,
            total_count = response.total_count,
            returned = response.items.len(),
            incomplete = response.incomplete_results,
            "search response decoded"
        );
        Ok(SearchPage {
            items: response.items,
            total_count: response.total_count,
        })
    }

    async fn fetch_secondary(&self, login: &str) -> Result<Vec<SecondaryEntity>, GatewayError> {
        let url = self.endpoint(&["users", login, "repos"])?;
        let mut items: ListRepositoriesResponse = self
            .get_json(
                url,
                &ListRepositoriesQuery {
                    per_page: SECONDARY_FETCH_CAP,
                    sort: RepositorySort::Updated,
                },
            )
            .await?;
        items.truncate(SECONDARY_FETCH_CAP as usize);
        debug!(login, returned = items.len(), "repository listing decoded");
        Ok(items)
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
