//! Text-generation providers

use async_trait::async_trait;
use gestor_config::AdvisorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AdvisorError, AdvisorResult};

const UA: &str = concat!("gestor/", env!("CARGO_PKG_VERSION"));

/// Something that turns a prompt into advice text
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    /// Generate text for `prompt`; an empty string means "no answer"
    async fn generate(&self, prompt: &str) -> AdvisorResult<String>;

    /// Short name for logs
    fn name(&self) -> String;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    pub(crate) fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Generate-content HTTP API client
pub struct HttpAdviceProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl HttpAdviceProvider {
    /// Build a client from config, reading the API key from the environment
    ///
    /// A missing key is not an error here; requests fail with
    /// `MissingApiKey` until one is provided.
    pub fn from_config(config: &AdvisorConfig) -> AdvisorResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            log::warn!(
                "Environment variable {} is not set; insights will be unavailable",
                config.api_key_env
            );
        }
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: &AdvisorConfig, api_key: Option<String>) -> AdvisorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(UA)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl AdviceProvider for HttpAdviceProvider {
    async fn generate(&self, prompt: &str) -> AdvisorResult<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AdvisorError::MissingApiKey {
                var: self.api_key_env.clone(),
            })?;

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        log::debug!("POST {} ({} prompt chars)", self.url(), prompt.chars().count());
        let response = self
            .client
            .post(self.url())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.text())
    }

    fn name(&self) -> String {
        format!("http:{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"- Dica 1\n"},{"text":"- Dica 2"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), "- Dica 1\n- Dica 2");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), "");
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(parsed.text(), "");
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "oi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents":[{"parts":[{"text":"oi"}]}]})
        );
    }

    #[test]
    fn test_url() {
        let mut config = AdvisorConfig::default();
        config.endpoint = "http://localhost:9/v1/".to_string();
        config.model = "m".to_string();
        let provider = HttpAdviceProvider::with_key(&config, None).unwrap();
        assert_eq!(provider.url(), "http://localhost:9/v1/models/m:generateContent");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let provider = HttpAdviceProvider::with_key(&AdvisorConfig::default(), None).unwrap();
        let err = provider.generate("x").await.unwrap_err();
        assert!(matches!(err, AdvisorError::MissingApiKey { .. }));
    }
}
