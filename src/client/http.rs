use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{FetchError, FetchResult, ResourceClient};
use crate::resources::FilteredResources;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub path: String,
    pub query_param: String,
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            path: "/admin/get_filtered_resources/".to_string(),
            query_param: "destination_id".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EndpointConfig {
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

pub struct HttpResourceClient {
    client: reqwest::Client,
    config: EndpointConfig,
}

impl HttpResourceClient {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let mut client_builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Ok(http_proxy) = std::env::var("HTTP_PROXY") {
            if let Ok(proxy) = reqwest::Proxy::http(&http_proxy) {
                client_builder = client_builder.proxy(proxy);
            }
        }

        if let Ok(https_proxy) = std::env::var("HTTPS_PROXY") {
            if let Ok(proxy) = reqwest::Proxy::https(&https_proxy) {
                client_builder = client_builder.proxy(proxy);
            }
        }

        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn fetch_filtered(&self, scope: &str) -> FetchResult<FilteredResources> {
        let response = self
            .client
            .get(self.config.url())
            .query(&[(self.config.query_param.as_str(), scope)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
            message: e.to_string(),
        })
    }

    fn describe_request(&self, scope: &str) -> String {
        let url = self.config.url();
        match reqwest::Url::parse_with_params(&url, &[(self.config.query_param.as_str(), scope)]) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}?{}={}", url, self.config.query_param, scope),
        }
    }

    fn client_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
