use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{ApiError, ResourceApi, StoreDirectory};
use crate::config::ApiConfig;
use crate::form::Resource;
use crate::model::{Store, StoreId, StoreInput};

const STORES_SEGMENT: &str = "stores";

/// Longest response body excerpt written to the log.
const LOG_BODY_LIMIT: usize = 512;

/// HTTP implementation of the backend collaborators.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| ApiError::Network {
            detail: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/api/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> RequestBuilder {
        self.request(method, url).json(body)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(
        &self,
        request: RequestBuilder,
        method: &Method,
        url: &Url,
    ) -> Result<String, ApiError> {
        let path = url.path();
        debug!("{method} {path}");

        let response = request.send().await.map_err(|e| {
            warn!("{method} {path} failed: {e}");
            ApiError::Network {
                detail: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Network {
            detail: format!("failed to read response body: {e}"),
        })?;
        debug!("{method} {path} -> {}", status.as_u16());

        if !status.is_success() {
            warn!(
                "{method} {path} returned {}: {}",
                status.as_u16(),
                truncate_for_log(&body)
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: Method,
        url: Url,
    ) -> Result<T, ApiError> {
        let body = self.execute(request, &method, &url).await?;
        parse_json(&body)
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("failed to decode response: {e}; body: {}", truncate_for_log(body));
        ApiError::Parse {
            detail: e.to_string(),
        }
    })
}

fn truncate_for_log(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_LIMIT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl StoreDirectory for HttpClient {
    async fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
        let url = self.endpoint(&[STORES_SEGMENT])?;
        let request = self.request(Method::GET, url.clone());
        self.fetch(request, Method::GET, url).await
    }

    async fn create_store(&self, input: &StoreInput) -> Result<Store, ApiError> {
        let url = self.endpoint(&[STORES_SEGMENT])?;
        let request = self.json_request(Method::POST, url.clone(), input);
        self.fetch(request, Method::POST, url).await
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for HttpClient {
    async fn list(&self, store: &StoreId) -> Result<Vec<R>, ApiError> {
        let url = self.endpoint(&[store.as_str(), R::SEGMENT])?;
        let request = self.request(Method::GET, url.clone());
        self.fetch(request, Method::GET, url).await
    }

    async fn create(&self, store: &StoreId, input: &R::Input) -> Result<(), ApiError> {
        let url = self.endpoint(&[store.as_str(), R::SEGMENT])?;
        let request = self.json_request(Method::POST, url.clone(), input);
        self.execute(request, &Method::POST, &url).await?;
        Ok(())
    }

    async fn update(
        &self,
        store: &StoreId,
        id: &R::Id,
        input: &R::Input,
    ) -> Result<(), ApiError> {
        let id = id.to_string();
        let url = self.endpoint(&[store.as_str(), R::SEGMENT, &id])?;
        let request = self.json_request(Method::PUT, url.clone(), input);
        self.execute(request, &Method::PUT, &url).await?;
        Ok(())
    }

    async fn delete(&self, store: &StoreId, id: &R::Id) -> Result<(), ApiError> {
        let id = id.to_string();
        let url = self.endpoint(&[store.as_str(), R::SEGMENT, &id])?;
        let request = self.request(Method::DELETE, url.clone());
        self.execute(request, &Method::DELETE, &url).await?;
        Ok(())
    }
}
