use anyhow::{bail, Context, Result};
use insight_core::AnalysisRecord;
use llm_client::{DeepSeekClient, GeminiClient, InsightApi};
use response_normalizer::ResponseNormalizer;

mod config;

use config::{AppConfig, Provider};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = if let Some(pos) = args.iter().position(|a| a == "--json") {
        args.remove(pos);
        true
    } else {
        false
    };
    let query = args.join(" ");
    if query.trim().is_empty() {
        bail!("usage: stoxity [--json] <ticker or company name>");
    }

    let config = AppConfig::from_env()?;
    tracing::info!("Analyzing '{}' via {:?}", query, config.provider);

    let record = fetch_record(&config, &query).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

/// Run one query → record pipeline. Transport failures bubble up to the user;
/// everything content-shaped is absorbed by the normalizer.
async fn fetch_record(config: &AppConfig, query: &str) -> Result<AnalysisRecord> {
    let record = match config.provider {
        Provider::Mock => mock_data::mock_record(query),
        Provider::DeepSeek => {
            let key = config
                .deepseek_api_key
                .clone()
                .context("DEEPSEEK_API_KEY not set")?;
            let payload = DeepSeekClient::new(key)
                .fetch_raw(query)
                .await
                .context("DeepSeek request failed")?;
            ResponseNormalizer::new().normalize(&payload, query)
        }
        Provider::Gemini => {
            let key = config
                .gemini_api_key
                .clone()
                .context("GEMINI_API_KEY not set")?;
            let payload = GeminiClient::new(key)
                .fetch_raw(query)
                .await
                .context("Gemini request failed")?;
            ResponseNormalizer::new().normalize(&payload, query)
        }
    };
    Ok(record)
}

fn print_record(record: &AnalysisRecord) {
    println!("{} — {}", record.symbol, record.name);

    let categories = [
        ("Financials", &record.insights.financials),
        ("Growth", &record.insights.growth),
        ("Risks", &record.insights.risks),
    ];
    for (title, rows) in categories {
        println!("\n{title}");
        for row in rows.iter() {
            let change = row.change.as_deref().unwrap_or("");
            println!(
                "  {:<28} {:<20} {:<16} {}",
                row.metric,
                row.value,
                change,
                row.trend.to_label()
            );
        }
    }

    println!("\nNews");
    for item in &record.news {
        println!("  [{}] {} ({})", item.category.as_str(), item.content, item.timestamp);
    }
}
