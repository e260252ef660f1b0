use insight_core::{AnalysisRecord, InsightRow, Insights, NewsCategory, NewsItem, Trend};

/// Fixed placeholder text for rows with no real data behind them
pub const UNAVAILABLE: &str = "Data unavailable";

const NO_CHANGE: &str = "N/A";

fn placeholder_row(metric: &str) -> InsightRow {
    InsightRow {
        metric: metric.to_string(),
        value: UNAVAILABLE.to_string(),
        change: Some(NO_CHANGE.to_string()),
        trend: Trend::Neutral,
    }
}

/// Clearly-labeled "data unavailable" rows for one insight category. Used to
/// backfill any category that extracted zero rows, so the UI always has
/// something to render under each header. Pure: same input, same output.
pub fn placeholder_rows(category: NewsCategory) -> Vec<InsightRow> {
    match category {
        NewsCategory::Financial => vec![
            placeholder_row("Revenue"),
            placeholder_row("Net Income"),
            placeholder_row("EPS"),
        ],
        NewsCategory::Growth => vec![
            placeholder_row("YOY Growth"),
            placeholder_row("Market Share"),
        ],
        NewsCategory::Risk => vec![
            placeholder_row("Market Risk"),
            placeholder_row("Regulatory Risk"),
        ],
    }
}

/// Schema-valid news placeholder for when no items could be extracted
pub fn placeholder_news(symbol: &str) -> Vec<NewsItem> {
    vec![NewsItem {
        id: format!("fallback-{}-0", symbol.to_lowercase()),
        content: format!(
            "Unable to retrieve latest news for {symbol}. Please check back later."
        ),
        category: NewsCategory::Financial,
        timestamp: "now".to_string(),
    }]
}

/// A complete, well-formed record for a query whose analysis failed outright.
/// Every field is populated with explicit placeholder content so downstream
/// consumers never see a missing shape.
pub fn placeholder_record(query: &str) -> AnalysisRecord {
    let symbol = query.trim().to_uppercase();
    AnalysisRecord {
        name: format!("{symbol} Corporation"),
        insights: Insights {
            financials: placeholder_rows(NewsCategory::Financial),
            growth: placeholder_rows(NewsCategory::Growth),
            risks: placeholder_rows(NewsCategory::Risk),
        },
        news: placeholder_news(&symbol),
        symbol,
    }
}
