// src/core/search_client.rs
//! Algolia job index client

use super::config_manager::SearchConfig;
use super::service_client::ServiceClient;
use crate::error::Unavailable;
use crate::skill_analysis::{JobIndex, JobRecord};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SERVICE: &str = "algolia";
/// Algolia refuses larger pages.
const MAX_HITS_PER_PAGE: usize = 1000;
const SKILL_ATTRIBUTES: &[&str] = &["skills", "required_skills"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryParams<'a> {
    query: String,
    hits_per_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    optional_words: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes_to_retrieve: Option<&'a [&'a str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<serde_json::Value>,
    #[serde(default)]
    nb_hits: u64,
}

/// Decode hits one by one so a single dirty record only costs itself.
fn decode_hits(hits: Vec<serde_json::Value>) -> Vec<JobRecord> {
    hits.into_iter()
        .filter_map(|hit| {
            let object_id = hit.get("objectID").cloned();
            match serde_json::from_value::<JobRecord>(hit) {
                Ok(job) => Some(job),
                Err(e) => {
                    warn!("Skipping undecodable posting {:?}: {}", object_id, e);
                    None
                }
            }
        })
        .collect()
}

pub struct AlgoliaClient {
    http: ServiceClient,
    query_path: String,
    filters: Option<String>,
}

impl AlgoliaClient {
    pub fn new(
        app_id: &str,
        api_key: &str,
        config: &SearchConfig,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let base_url = config
            .host
            .clone()
            .unwrap_or_else(|| format!("https://{}-dsn.algolia.net", app_id));

        let http = ServiceClient::new(
            SERVICE,
            base_url,
            &[
                ("x-algolia-application-id", app_id),
                ("x-algolia-api-key", api_key),
            ],
            timeout_seconds,
        )?;

        Ok(Self {
            http,
            query_path: format!("/1/indexes/{}/query", config.index_name),
            filters: config.filters.clone(),
        })
    }

    async fn query(&self, params: QueryParams<'_>) -> Result<QueryResponse, Unavailable> {
        debug!(
            "Algolia query '{}' (hitsPerPage={})",
            params.query, params.hits_per_page
        );
        self.http.post_json(&self.query_path, &params).await
    }

    fn optional_terms<'a>(&'a self, terms: &'a [String], hits_per_page: usize) -> QueryParams<'a> {
        QueryParams {
            query: terms.join(" "),
            hits_per_page,
            optional_words: Some(terms),
            attributes_to_retrieve: None,
            filters: self.filters.as_deref(),
        }
    }

    fn corpus_query(&self, limit: usize) -> QueryParams<'_> {
        QueryParams {
            query: String::new(),
            hits_per_page: limit.min(MAX_HITS_PER_PAGE),
            optional_words: None,
            attributes_to_retrieve: Some(SKILL_ATTRIBUTES),
            filters: self.filters.as_deref(),
        }
    }

    pub async fn fetch_skill_corpus(&self, limit: usize) -> Result<Vec<JobRecord>, Unavailable> {
        let response = self.query(self.corpus_query(limit)).await?;
        Ok(decode_hits(response.hits))
    }

    pub async fn count_matching(&self, terms: &[String]) -> Result<u64, Unavailable> {
        let response = self.query(self.optional_terms(terms, 0)).await?;
        Ok(response.nb_hits)
    }

    pub async fn search_optional(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<JobRecord>, Unavailable> {
        let response = self
            .query(self.optional_terms(terms, limit.min(MAX_HITS_PER_PAGE)))
            .await?;
        Ok(decode_hits(response.hits))
    }
}

/// The search index as seen by the analyzers: either a live client or
/// nothing, decided once from configuration.
pub enum SearchBackend {
    Configured(AlgoliaClient),
    Unconfigured,
}

impl SearchBackend {
    pub fn from_config(config: &SearchConfig, timeout_seconds: u64) -> Result<Self> {
        match config.credentials() {
            Some((app_id, api_key)) => Ok(SearchBackend::Configured(AlgoliaClient::new(
                app_id,
                api_key,
                config,
                timeout_seconds,
            )?)),
            None => {
                warn!("Algolia credentials missing, search features are disabled");
                Ok(SearchBackend::Unconfigured)
            }
        }
    }
}

#[rocket::async_trait]
impl JobIndex for SearchBackend {
    fn is_configured(&self) -> bool {
        matches!(self, SearchBackend::Configured(_))
    }

    async fn fetch_skill_corpus(&self, limit: usize) -> Result<Vec<JobRecord>, Unavailable> {
        match self {
            SearchBackend::Configured(client) => client.fetch_skill_corpus(limit).await,
            SearchBackend::Unconfigured => Err(Unavailable::NotConfigured("search")),
        }
    }

    async fn count_matching(&self, terms: &[String]) -> Result<u64, Unavailable> {
        match self {
            SearchBackend::Configured(client) => client.count_matching(terms).await,
            SearchBackend::Unconfigured => Err(Unavailable::NotConfigured("search")),
        }
    }

    async fn search_optional(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<JobRecord>, Unavailable> {
        match self {
            SearchBackend::Configured(client) => client.search_optional(terms, limit).await,
            SearchBackend::Unconfigured => Err(Unavailable::NotConfigured("search")),
        }
    }
}
