use anyhow::{bail, Result};
use std::env;

/// Which upstream supplies the analysis payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    Gemini,
    Mock,
}

impl Provider {
    fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_lowercase().as_str() {
            "deepseek" => Ok(Provider::DeepSeek),
            "gemini" => Ok(Provider::Gemini),
            "mock" => Ok(Provider::Mock),
            other => bail!("unknown provider '{other}' (expected deepseek, gemini, or mock)"),
        }
    }
}

/// Environment-driven configuration. API keys are read here and injected into
/// the clients; nothing downstream reads the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: Provider,
    pub deepseek_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let provider = env::var("STOXITY_PROVIDER")
            .map(|label| Provider::from_label(&label))
            .unwrap_or(Ok(Provider::Mock))?;

        let config = Self {
            provider,
            deepseek_api_key: env::var("DEEPSEEK_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.provider {
            Provider::DeepSeek if self.deepseek_api_key.is_none() => {
                bail!("STOXITY_PROVIDER=deepseek requires DEEPSEEK_API_KEY")
            }
            Provider::Gemini if self.gemini_api_key.is_none() => {
                bail!("STOXITY_PROVIDER=gemini requires GEMINI_API_KEY")
            }
            _ => Ok(()),
        }
    }
}
