use thiserror::Error;

/// Failures inside the normalization pipeline. These never escape the
/// normalizer's public boundary; they are absorbed into a placeholder record.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("payload has no extractable content field")]
    MissingContent,

    #[error("no insight or news data could be extracted")]
    NoExtractableData,
}

/// Transport-layer failures from the upstream LLM API. Unlike
/// `NormalizeError`, these surface to the caller as user-visible errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    Api(String),

    #[error("API request failed with status {0}")]
    Status(u16),

    #[error("query must not be empty")]
    EmptyQuery,
}
