use async_trait::async_trait;
use insight_core::ProviderError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::InsightApi;

const API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const MODEL: &str = "deepseek-chat";

const SYSTEM_PROMPT: &str = "You are a financial analyst assistant. Analyze earnings calls, \
SEC filings, and recent news for the specified company or ticker symbol. Provide financial \
metrics, growth indicators, risk factors, and recent news in a structured format.";

/// Chat-completion client for the DeepSeek API
#[derive(Clone)]
pub struct DeepSeekClient {
    api_key: String,
    client: Client,
}

impl DeepSeekClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { api_key, client }
    }

    fn request_body(query: &str) -> Value {
        json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Use earnings calls, SEC filings and recent news to analyze the {query} \
                         stock and produce an overall insight. Data in table format and numbers \
                         in tweet-like news format."
                    )
                }
            ],
            "temperature": 0.5,
            "max_tokens": 4000
        })
    }
}

#[async_trait]
impl InsightApi for DeepSeekClient {
    async fn fetch_raw(&self, query: &str) -> Result<Value, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProviderError::EmptyQuery);
        }

        tracing::info!("Requesting DeepSeek analysis for '{}'", query);
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(query))
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("DeepSeek request for '{}' failed with {}", query, status);
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
    fn request_body_carries_model_and_both_messages() {
        let body = DeepSeekClient::request_body("AAPL");
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("AAPL"));
        assert_eq!(body["max_tokens"], 4000);
    }
}
