// ABOUTME: reqwest-backed Rancher API client with basic-auth API keys.
// ABOUTME: Follows collection pagination and posts actions to their advertised URLs.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;

use super::api::RancherApi;
use super::error::ApiError;
use super::model::{Collection, Environment, Service, ServiceUpgrade, action};
use crate::types::ServiceId;

const USER_AGENT: &str = concat!("drone-rancher/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one Rancher API endpoint (e.g. `https://rancher.example.com/v1`).
pub struct RancherClient {
    http: Client,
    endpoint: String,
    access_key: String,
    secret_key: String,
}

impl std::fmt::Debug for RancherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RancherClient")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

impl RancherClient {
    pub fn new(
        endpoint: &str,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(endpoint).map_err(|e| ApiError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self
            .authed(request)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        resp.json::<T>().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url, "GET");
        self.send(url, self.http.get(url)).await
    }

    /// Fetch every page of a collection.
    ///
    /// Each page is fetched at most once; a `next` link back to a page
    /// already seen ends the listing.
    async fn list_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, ApiError> {
        let mut url = self.url(collection);
        let mut visited = HashSet::new();
        let mut items = Vec::new();

        loop {
            let page: Collection<T> = self.get(&url).await?;
            let next = page.next_page().map(str::to_string);
            items.extend(page.data);
            visited.insert(url);

            match next {
                Some(next) if visited.contains(&next) => {
                    tracing::warn!(collection, url = %next, "pagination loops back to a visited page");
                    break;
                }
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(items)
    }

    async fn post_action<B: Serialize + ?Sized>(
        &self,
        service: &Service,
        name: &str,
        body: Option<&B>,
    ) -> Result<Service, ApiError> {
        let url = match service.action_url(name) {
            Some(url) => url.to_string(),
            None => format!("{}?action={}", self.url(&format!("services/{}", service.id)), name),
        };
        tracing::debug!(url, action = name, "POST");

        let request = self.http.post(&url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        self.send(&url, request).await
    }
}

#[async_trait]
impl RancherApi for RancherClient {
    async fn list_environments(&self) -> Result<Vec<Environment>, ApiError> {
        self.list_all("environments").await
    }

    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.list_all("services").await
    }

    async fn service_by_id(&self, id: &ServiceId) -> Result<Service, ApiError> {
        self.get(&self.url(&format!("services/{id}"))).await
    }

    async fn upgrade(
        &self,
        service: &Service,
        request: &ServiceUpgrade,
    ) -> Result<Service, ApiError> {
        self.post_action(service, action::UPGRADE, Some(request))
            .await
    }

    async fn finish_upgrade(&self, service: &Service) -> Result<Service, ApiError> {
        self.post_action::<()>(service, action::FINISH_UPGRADE, None)
            .await
    }
}
