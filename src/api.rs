//! Shared HTTP plumbing for the REST API: endpoint joining, bearer auth, and mapping of
//! `{ error?, message? }` failure bodies.

use crate::error::ApiError;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const GENERIC_FAILURE: &str = "API request failed";

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> String {
        self.message
            .filter(|m| !m.is_empty())
            .or(self.error.filter(|e| !e.is_empty()))
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiError> {
        // a base without trailing slash would drop its last segment on join
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|_| ApiError::Endpoint(base_url.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| ApiError::Endpoint(path.to_string()))
    }

    pub fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&str>,
    ) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and decodes a JSON body, mapping non-2xx responses to `ApiError::Status`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(ApiError::Transport)?;
        let status = response.status();

        if status.is_success() {
            return response.json::<T>().await.map_err(ApiError::Decode);
        }

        let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            message: body.into_message(),
        })
    }
}
