use serde::{Deserialize, Serialize};

/// Each insight category is truncated to this many rows. The UI renders a
/// fixed-height table per category, so this cap is part of the output contract.
pub const MAX_ROWS_PER_CATEGORY: usize = 5;

/// Directional classification of a metric's change. Derived from free text,
/// never user-supplied directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Default for Trend {
    fn default() -> Self {
        Trend::Neutral
    }
}

impl Trend {
    /// Human-readable label for the trend
    pub fn to_label(&self) -> &'static str {
        match self {
            Trend::Up => "Up",
            Trend::Down => "Down",
            Trend::Neutral => "Neutral",
        }
    }
}

/// Topical category for a short-form news item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Financial,
    Growth,
    Risk,
}

impl NewsCategory {
    /// Key used in news item ids and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::Financial => "financial",
            NewsCategory::Growth => "growth",
            NewsCategory::Risk => "risk",
        }
    }

    /// Parse a payload-supplied category label, defaulting to `Financial`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "growth" => NewsCategory::Growth,
            "risk" | "risks" => NewsCategory::Risk,
            _ => NewsCategory::Financial,
        }
    }
}

/// One metric/value/trend line item in a financial, growth, or risk table.
/// `metric` and `value` are always non-empty; missing source text is
/// substituted with a placeholder token at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRow {
    pub metric: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
    #[serde(default)]
    pub trend: Trend,
}

/// A short, categorized text blurb simulating a social-media-style update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Unique within a response: `{category}-{generation millis}-{index}`
    pub id: String,
    pub content: String,
    pub category: NewsCategory,
    pub timestamp: String,
}

/// The three insight tables the UI always renders. None of the lists is ever
/// empty; absent data is represented by explicit placeholder rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub financials: Vec<InsightRow>,
    pub growth: Vec<InsightRow>,
    pub risks: Vec<InsightRow>,
}

/// Normalized analysis output for one search request. Constructed once per
/// request and replaced wholesale on the next search; field names and the
/// 3-category/5-row-max structure are a hard contract with the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Always upper-cased
    pub symbol: String,
    pub name: String,
    pub insights: Insights,
    pub news: Vec<NewsItem>,
}

impl AnalysisRecord {
    /// Check the structural invariants the UI relies on: every category is
    /// non-empty and within the row cap, and symbol is upper-cased.
    pub fn is_schema_valid(&self) -> bool {
        let categories = [
            &self.insights.financials,
            &self.insights.growth,
            &self.insights.risks,
        ];
        categories
            .iter()
            .all(|rows| !rows.is_empty() && rows.len() <= MAX_ROWS_PER_CATEGORY)
            && self.symbol == self.symbol.to_uppercase()
            && !self.news.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Up).unwrap(), "\"up\"");
        assert_eq!(serde_json::to_string(&Trend::Neutral).unwrap(), "\"neutral\"");
    }

    #[test]
    fn category_label_parsing_defaults_to_financial() {
        assert_eq!(NewsCategory::from_label("Growth"), NewsCategory::Growth);
        assert_eq!(NewsCategory::from_label("RISK"), NewsCategory::Risk);
        assert_eq!(NewsCategory::from_label("anything"), NewsCategory::Financial);
        assert_eq!(NewsCategory::from_label(""), NewsCategory::Financial);
    }

    #[test]
    fn insight_row_omits_missing_change() {
        let row = InsightRow {
            metric: "Revenue".to_string(),
            value: "$1B".to_string(),
            change: None,
            trend: Trend::Neutral,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("change").is_none());
    }
}
