use async_trait::async_trait;
use insight_core::ProviderError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::InsightApi;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// `generateContent` client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_key,
            model,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    fn request_body(query: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{
                    "text": format!(
                        "Provide detailed financial analysis for {query} stock including \
                         financial metrics, growth indicators, risk factors, and news \
                         insights. Format the response as JSON."
                    )
                }]
            }]
        })
    }
}

#[async_trait]
impl InsightApi for GeminiClient {
    async fn fetch_raw(&self, query: &str) -> Result<Value, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProviderError::EmptyQuery);
        }

        tracing::info!("Requesting Gemini analysis for '{}'", query);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(query))
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Gemini request for '{}' failed with {}", query, status);
            return Err(ProviderError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_the_model() {
        let client = GeminiClient::new("key".to_string());
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );

        let custom = GeminiClient::with_model("key".to_string(), "gemini-1.5-flash".to_string());
        assert!(custom.endpoint().contains("gemini-1.5-flash"));
    }

    #[test]
    fn request_body_asks_for_json() {
        let body = GeminiClient::request_body("TSLA");
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("TSLA"));
        assert!(text.contains("JSON"));
    }
}
