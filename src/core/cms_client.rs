// src/core/cms_client.rs
//! Contentstack delivery API client

use super::config_manager::ContentConfig;
use super::service_client::ServiceClient;
use crate::error::Unavailable;
use crate::skill_analysis::{Company, CompanyDirectory, LearningCatalog, LearningResource};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const SERVICE: &str = "contentstack";
const LEARNING_RESOURCE_TYPE: &str = "learning_resource";
const COMPANY_TYPE: &str = "company";
/// Delivery API page size ceiling.
const PAGE_SIZE: usize = 100;
const MAX_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct EntriesResponse<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct EntryResponse<T> {
    entry: T,
}

pub struct ContentstackClient {
    http: ServiceClient,
    environment: String,
}

impl ContentstackClient {
    pub fn new(
        api_key: &str,
        delivery_token: &str,
        config: &ContentConfig,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http = ServiceClient::new(
            SERVICE,
            config.host.clone(),
            &[("api_key", api_key), ("access_token", delivery_token)],
            timeout_seconds,
        )?;

        Ok(Self {
            http,
            environment: config.environment.clone(),
        })
    }

    /// Every entry of a content type, following pagination.
    pub async fn entries<T>(&self, content_type: &str) -> Result<Vec<T>, Unavailable>
    where
        T: DeserializeOwned,
    {
        let endpoint = format!("/v3/content_types/{}/entries", content_type);
        let mut all = Vec::new();

        for page in 0..MAX_PAGES {
            let query = [
                ("environment", self.environment.clone()),
                ("limit", PAGE_SIZE.to_string()),
                ("skip", (page * PAGE_SIZE).to_string()),
            ];
            let response: EntriesResponse<T> = self.http.get(&endpoint, &query).await?;
            let fetched = response.entries.len();
            all.extend(response.entries);

            if fetched < PAGE_SIZE {
                break;
            }
        }

        debug!("Fetched {} {} entries", all.len(), content_type);
        Ok(all)
    }

    pub async fn entry<T>(&self, content_type: &str, uid: &str) -> Result<T, Unavailable>
    where
        T: DeserializeOwned,
    {
        let endpoint = format!("/v3/content_types/{}/entries/{}", content_type, uid);
        let query = [("environment", self.environment.clone())];
        let response: EntryResponse<T> = self.http.get(&endpoint, &query).await?;
        Ok(response.entry)
    }
}

/// The CMS as seen by the analyzers.
pub enum ContentBackend {
    Configured(ContentstackClient),
    Unconfigured,
}

impl ContentBackend {
    pub fn from_config(config: &ContentConfig, timeout_seconds: u64) -> Result<Self> {
        match config.credentials() {
            Some((api_key, token)) => Ok(ContentBackend::Configured(ContentstackClient::new(
                api_key,
                token,
                config,
                timeout_seconds,
            )?)),
            None => {
                warn!("Contentstack credentials missing, learning resources are disabled");
                Ok(ContentBackend::Unconfigured)
            }
        }
    }

    fn client(&self) -> Result<&ContentstackClient, Unavailable> {
        match self {
            ContentBackend::Configured(client) => Ok(client),
            ContentBackend::Unconfigured => Err(Unavailable::NotConfigured("content")),
        }
    }
}

#[rocket::async_trait]
impl LearningCatalog for ContentBackend {
    fn is_configured(&self) -> bool {
        matches!(self, ContentBackend::Configured(_))
    }

    async fn learning_resources(&self) -> Result<Vec<LearningResource>, Unavailable> {
        self.client()?.entries(LEARNING_RESOURCE_TYPE).await
    }
}

#[rocket::async_trait]
impl CompanyDirectory for ContentBackend {
    async fn company(&self, uid: &str) -> Result<Company, Unavailable> {
        self.client()?.entry(COMPANY_TYPE, uid).await
    }
}
