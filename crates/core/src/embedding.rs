// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Embedding providers.
//!
//! The execution engine treats the provider as an opaque, blocking,
//! network-bound function from text to a fixed-length vector. Failures are
//! infrastructure faults and are never recovered per iteration.

use crate::config::Settings;
use crate::error::EmbeddingError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Converts text into an embedding vector.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text`.
    fn generate_embedding_vector(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Client for the OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAiEmbeddingClient {
    /// Build a client from settings.
    pub fn new(settings: &Settings) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.openai_api_key.clone(),
            url: settings.endpoint("embeddings"),
            model: settings.embedding_model.clone(),
        })
    }

    /// Override the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The model requests are sent for.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn parse(&self, input: &str, body: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response: EmbeddingResponse = serde_json::from_str(body)
            .map_err(|e| EmbeddingError::MalformedResponse(format!("{e}: {body}")))?;

        let first = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmptyResponse {
                input: input.to_string(),
                model: self.model.clone(),
            })?;

        if first.embedding.is_empty() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "response for model {} carried an empty embedding",
                self.model
            )));
        }
        Ok(first.embedding)
    }
}

impl EmbeddingProvider for OpenAiEmbeddingClient {
    fn generate_embedding_vector(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!(model = %self.model, chars = text.len(), "requesting embedding");

        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            input: text,
            model: &self.model,
        });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }
        self.parse(text, &body)
    }
}

/// Provider backed by a fixed lookup table.
///
/// Useful for offline runs and tests: unknown text is reported as an
/// [`EmbeddingError::EmptyResponse`].
#[derive(Debug, Clone, Default)]
pub struct StaticEmbeddingProvider {
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbeddingProvider {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }
}

impl EmbeddingProvider for StaticEmbeddingProvider {
    fn generate_embedding_vector(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbeddingError::EmptyResponse {
                input: text.to_string(),
                model: "static".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiEmbeddingClient {
        OpenAiEmbeddingClient::new(&Settings::default()).unwrap()
    }

    #[test]
    fn test_client_uses_settings() {
        let settings = Settings {
            base_url: "http://localhost:9000/v1".into(),
            embedding_model: "nomic-embed-text".into(),
            ..Settings::default()
        };
        let client = OpenAiEmbeddingClient::new(&settings).unwrap();
        assert_eq!(client.url, "http://localhost:9000/v1/embeddings");
        assert_eq!(client.model(), "nomic-embed-text");
        assert_eq!(client.with_model("other").model(), "other");
    }

    #[test]
    fn test_parse_embedding() {
        let body = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,-0.2,0.3]}]}"#;
        let v = client().parse("hi", body).unwrap();
        assert_eq!(v, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_parse_empty_data() {
        let err = client().parse("hi", r#"{"data":[]}"#).unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyResponse { .. }));
        assert!(err.to_string().contains("input 'hi'"));
    }

    #[test]
    fn test_parse_missing_embedding() {
        let err = client().parse("hi", r#"{"data":[{"index":0}]}"#).unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_garbage() {
        let err = client().parse("hi", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticEmbeddingProvider::new().with("dog", vec![1.0, 0.0]);
        assert_eq!(provider.generate_embedding_vector("dog").unwrap(), vec![1.0, 0.0]);
        assert!(provider.generate_embedding_vector("cat").is_err());
    }

    #[test]
    fn test_mock_provider() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_generate_embedding_vector()
            .times(1)
            .returning(|text: &str| Ok(vec![text.len() as f32, 0.5]));
        assert_eq!(mock.generate_embedding_vector("hello").unwrap(), vec![5.0, 0.5]);
    }
}
