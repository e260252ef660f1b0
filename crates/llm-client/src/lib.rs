//! Thin HTTP collaborators for the upstream LLM APIs. Each client returns the
//! raw response payload or a transport error; all parsing belongs to the
//! response-normalizer crate. API keys are injected at construction time, so
//! nothing here touches credential storage.

pub mod deepseek;
pub mod gemini;

use async_trait::async_trait;
use insight_core::ProviderError;
use serde_json::Value;

pub use deepseek::DeepSeekClient;
pub use gemini::GeminiClient;

/// One upstream analysis request: free-text query in, opaque payload out.
/// Transport failures (network, non-2xx status) surface as `ProviderError`
/// and never reach the normalizer.
#[async_trait]
pub trait InsightApi: Send + Sync {
    async fn fetch_raw(&self, query: &str) -> Result<Value, ProviderError>;
}
