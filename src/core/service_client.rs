// src/core/service_client.rs
//! Shared JSON-over-HTTP client for the hosted search and content services

use crate::error::Unavailable;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, trace};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    service: &'static str,
}

impl ServiceClient {
    /// Create a client that sends `headers` on every request and gives up
    /// after `timeout_seconds`.
    pub fn new(
        service: &'static str,
        base_url: String,
        headers: &[(&'static str, &str)],
        timeout_seconds: u64,
    ) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for &(name, value) in headers {
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for {} header {}", service, name))?;
            default_headers.insert(HeaderName::from_static(name), value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(default_headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode a JSON reply
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R, Unavailable>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        self.read_json(response).await
    }

    /// GET with query parameters and decode a JSON reply
    pub async fn get<R>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<R, Unavailable>
    where
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        self.read_json(response).await
    }

    async fn read_json<R>(&self, response: reqwest::Response) -> Result<R, Unavailable>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<R>().await.map_err(|e| Unavailable::Decode {
                service: self.service,
                message: e.to_string(),
            })
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("{} error response {}: {}", self.service, status, body);
            Err(Unavailable::Status {
                service: self.service,
                status: status.as_u16(),
                body,
            })
        }
    }

    fn transport(&self, e: reqwest::Error) -> Unavailable {
        Unavailable::Transport {
            service: self.service,
            message: e.to_string(),
        }
    }
}
