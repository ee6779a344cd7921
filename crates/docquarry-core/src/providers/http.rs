//! HTTP-backed capability providers
//!
//! Talks to OpenAI-compatible inference services: `/v1/embeddings` for the
//! embedder and `/v1/rerank` for the cross-encoder. Requests carry the
//! configured timeout; a timeout surfaces as a failed call, never a hang.

use super::{Embedder, RerankDocument, RerankResult, Reranker};
use crate::config::EmbeddingServiceConfig;
use crate::error::{DocQuarryError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default embedding dimensionality when the service does not advertise one
const DEFAULT_DIMENSIONS: usize = 384;

/// Embedder backed by an external HTTP embeddings service
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
    dimensions: usize,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DocQuarryError::Http)?;

        let dimensions = config.dimensions.unwrap_or(DEFAULT_DIMENSIONS);

        Ok(Self {
            http_client,
            config,
            dimensions,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingServiceConfig::default())
    }
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| DocQuarryError::ExternalService("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbedRequest {
            model: self.config.model.clone(),
            input: texts.to_vec(),
        };

        let url = format!("{}/v1/embeddings", self.config.url);
        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocQuarryError::ExternalService(format!(
                "Embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response.json().await?;
        let embeddings = order_embeddings(embed_response, texts.len())?;

        for embedding in &embeddings {
            if embedding.len() != self.dimensions {
                return Err(DocQuarryError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Reorder response rows by their index field; services may return them
/// out of order.
fn order_embeddings(response: EmbedResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    if response.data.len() != expected {
        return Err(DocQuarryError::ExternalService(format!(
            "Embedding service returned {} vectors for {} inputs",
            response.data.len(),
            expected
        )));
    }

    let mut rows: Vec<EmbedData> = response.data;
    rows.sort_by_key(|d| d.index);
    Ok(rows.into_iter().map(|d| d.embedding).collect())
}

/// Reranker backed by an external HTTP rerank service
pub struct HttpReranker {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
}

impl HttpReranker {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DocQuarryError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingServiceConfig::default())
    }
}

#[derive(Serialize)]
struct RerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankEntry>,
}

#[derive(Deserialize)]
struct RerankEntry {
    index: usize,
    relevance_score: f64,
}

#[async_trait]
impl Reranker for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
    ) -> Result<Vec<RerankResult>> {
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let request = RerankRequest {
            model: self.config.rerank_model.clone(),
            query: query.to_string(),
            documents: documents.iter().map(|d| d.text.clone()).collect(),
        };

        let url = format!("{}/v1/rerank", self.config.rerank_url());
        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocQuarryError::ExternalService(format!(
                "Rerank service error (HTTP {}): {}",
                status, body
            )));
        }

        let rerank_response: RerankResponse = response.json().await?;
        map_rerank_results(rerank_response, documents)
    }

    fn model_name(&self) -> &str {
        &self.config.rerank_model
    }
}

fn map_rerank_results(
    response: RerankResponse,
    documents: &[RerankDocument],
) -> Result<Vec<RerankResult>> {
    let mut results = Vec::with_capacity(response.results.len());
    for entry in response.results {
        let doc = documents.get(entry.index).ok_or_else(|| {
            DocQuarryError::ExternalService(format!(
                "Rerank service returned index {} for {} documents",
                entry.index,
                documents.len()
            ))
        })?;
        results.push(RerankResult {
            id: doc.id.clone(),
            score: entry.relevance_score,
        });
    }
    Ok(results)
}
