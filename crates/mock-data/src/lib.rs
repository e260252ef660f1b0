//! Offline supplier of the normalized schema: randomized but schema-valid
//! analysis records for demos and for running without an API key. Produces
//! exactly the same `AnalysisRecord` shape the normalizer emits.

use chrono::Utc;
use insight_core::{AnalysisRecord, InsightRow, Insights, NewsCategory, NewsItem, Trend};
use rand::Rng;

/// Well-known tickers with their company names
const COMPANY_NAMES: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com Inc."),
    ("META", "Meta Platforms Inc."),
    ("TSLA", "Tesla Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("V", "Visa Inc."),
    ("JNJ", "Johnson & Johnson"),
];

/// Company-name fragments mapped to tickers, for free-text queries
const COMPANY_LOOKUP: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("meta", "META"),
    ("facebook", "META"),
    ("tesla", "TSLA"),
    ("nvidia", "NVDA"),
    ("jpmorgan", "JPM"),
    ("visa", "V"),
    ("johnson", "JNJ"),
];

/// Company name for a symbol, with a generic fallback
pub fn company_name(symbol: &str) -> String {
    let upper = symbol.to_uppercase();
    COMPANY_NAMES
        .iter()
        .find(|(sym, _)| *sym == upper)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("{upper} Corporation"))
}

/// Resolve a free-text query to a ticker. Known company names win over the
/// short-symbol passthrough so "apple" maps to AAPL rather than APPLE.
pub fn resolve_symbol(query: &str) -> String {
    let trimmed = query.trim();
    let lowered = trimmed.to_lowercase();
    for (fragment, symbol) in COMPANY_LOOKUP {
        if lowered.contains(fragment) {
            return symbol.to_string();
        }
    }
    trimmed.to_uppercase()
}

fn row(metric: &str, value: String, change: String, trend: Trend) -> InsightRow {
    InsightRow {
        metric: metric.to_string(),
        value,
        change: Some(change),
        trend,
    }
}

/// Generate a schema-valid mock record for a query
pub fn mock_record(query: &str) -> AnalysisRecord {
    let mut rng = rand::thread_rng();
    let symbol = resolve_symbol(query);
    let name = company_name(&symbol);

    let financials = vec![
        row(
            "Revenue",
            format!("${:.2}B", rng.gen_range(1.0..100.0)),
            format!("+{:.1}%", rng.gen_range(0.0..20.0)),
            Trend::Up,
        ),
        row(
            "Net Income",
            format!("${:.2}B", rng.gen_range(0.2..25.0)),
            format!("+{:.1}%", rng.gen_range(0.0..15.0)),
            Trend::Up,
        ),
        row(
            "EPS",
            format!("${:.2}", rng.gen_range(0.5..10.0)),
            format!("+{:.1}%", rng.gen_range(0.0..12.0)),
            Trend::Up,
        ),
        row(
            "Operating Margin",
            format!("{:.1}%", rng.gen_range(5.0..30.0)),
            format!("{:.1}%", rng.gen_range(-2.0..3.0)),
            if rng.gen_bool(0.5) { Trend::Up } else { Trend::Down },
        ),
        row(
            "Cash Flow",
            format!("${:.2}B", rng.gen_range(0.5..15.0)),
            format!("+{:.1}%", rng.gen_range(0.0..10.0)),
            Trend::Up,
        ),
    ];

    let growth = vec![
        row(
            "YOY Growth",
            format!("{:.1}%", rng.gen_range(1.0..40.0)),
            format!("+{:.1}%", rng.gen_range(0.0..15.0)),
            Trend::Up,
        ),
        row(
            "Market Share",
            format!("{:.1}%", rng.gen_range(1.0..20.0)),
            format!("+{:.1}%", rng.gen_range(0.0..3.0)),
            Trend::Up,
        ),
        row(
            "R&D Spending",
            format!("${:.2}B", rng.gen_range(0.5..10.0)),
            format!("+{:.1}%", rng.gen_range(0.0..25.0)),
            Trend::Up,
        ),
        row(
            "Customer Acquisition Cost",
            format!("${:.2}", rng.gen_range(10.0..200.0)),
            format!("-{:.1}%", rng.gen_range(0.0..10.0)),
            Trend::Down,
        ),
    ];

    let risks = vec![
        row(
            "Debt to Equity",
            format!("{:.2}", rng.gen_range(0.1..2.0)),
            if rng.gen_bool(0.5) { "High" } else { "Medium" }.to_string(),
            if rng.gen_bool(0.5) { Trend::Up } else { Trend::Neutral },
        ),
        row(
            "Competition",
            if rng.gen_bool(0.3) { "High" } else { "Medium" }.to_string(),
            if rng.gen_bool(0.5) { "Increasing" } else { "Stable" }.to_string(),
            Trend::Neutral,
        ),
        row(
            "Regulatory Risks",
            if rng.gen_bool(0.4) { "High" } else { "Low" }.to_string(),
            if rng.gen_bool(0.5) { "Increasing" } else { "Stable" }.to_string(),
            Trend::Neutral,
        ),
        row(
            "Market Volatility",
            format!("{:.0}%", rng.gen_range(5.0..50.0)),
            if rng.gen_bool(0.6) { "High Impact" } else { "Moderate Impact" }.to_string(),
            if rng.gen_bool(0.5) { Trend::Up } else { Trend::Neutral },
        ),
    ];

    let generated_at = Utc::now().timestamp_millis();
    let quarter = rng.gen_range(1..=4);
    let news = vec![
        NewsItem {
            id: format!("financial-{generated_at}-0"),
            content: format!(
                "{symbol}'s Q{quarter} revenue hit ${:.2}B, exceeding analyst expectations by \
                 {:.1}%. Strong product sales driving growth. #Earnings",
                rng.gen_range(1.0..100.0),
                rng.gen_range(0.5..15.0),
            ),
            category: NewsCategory::Financial,
            timestamp: "2h ago".to_string(),
        },
        NewsItem {
            id: format!("financial-{generated_at}-1"),
            content: format!(
                "{symbol}'s cash reserves at all-time high of ${:.1}B. Management signals \
                 increased shareholder returns through dividends and buybacks. #StockAlert",
                rng.gen_range(5.0..50.0),
            ),
            category: NewsCategory::Financial,
            timestamp: "4h ago".to_string(),
        },
        NewsItem {
            id: format!("growth-{generated_at}-2"),
            content: format!(
                "{symbol}'s market share grew to {:.1}%, overtaking key competitors. \
                 Expansion strategy paying off according to the latest earnings call.",
                rng.gen_range(5.0..25.0),
            ),
            category: NewsCategory::Growth,
            timestamp: "5h ago".to_string(),
        },
        NewsItem {
            id: format!("risk-{generated_at}-3"),
            content: format!(
                "SEC filings reveal {symbol} facing potential regulatory challenges in key \
                 markets. Impact on operations remains uncertain.",
            ),
            category: NewsCategory::Risk,
            timestamp: "8h ago".to_string(),
        },
        NewsItem {
            id: format!("risk-{generated_at}-4"),
            content: format!(
                "Debt-to-equity ratio for {symbol} at {:.2}. Interest rate sensitivity could \
                 impact financing costs in coming quarters.",
                rng.gen_range(0.1..2.0),
            ),
            category: NewsCategory::Risk,
            timestamp: "1d ago".to_string(),
        },
    ];

    AnalysisRecord {
        symbol,
        name,
        insights: Insights {
            financials,
            growth,
            risks,
        },
        news,
    }
}
