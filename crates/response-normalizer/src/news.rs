use chrono::Utc;
use insight_core::{NewsCategory, NewsItem};
use regex::Regex;
use std::sync::LazyLock;

use crate::sections;
use crate::table::strip_markup;
use crate::timestamps::TimestampPicker;

/// `Tweet: ...` lines, case-insensitive
static TWEET_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tweet\s*:\s*(.+)").unwrap());

/// Bold-quoted fragments, e.g. `**"Revenue beat expectations"**`
static BOLD_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\*\*\s*["“]([^"”]+)["”]\s*\*\*"#).unwrap());

/// Explicit date/time tokens the source text may carry: ISO dates, relative
/// offsets like `3h ago`, or day words.
static EXPLICIT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{4}-\d{2}-\d{2}\b|\b\d+\s*[hmd]\s*ago\b|\b(?:today|yesterday|just now)\b")
        .unwrap()
});

const BIRD_GLYPH: char = '🐦';

const BULLET_GLYPHS: &[&str] = &["•", "✅", "➡️", "👉", "✓", "* ", "- "];

/// Headings that mark a section as news-like
const NEWS_SECTION_KEYWORDS: &[&str] = &["news", "tweet", "update"];

const RISK_KEYWORDS: &[&str] = &["risk", "warn", "threat", "challenge"];
const GROWTH_KEYWORDS: &[&str] = &["growth", "expan", "increas", "improv"];

/// Classify a news fragment by keyword scan. Risk wins over growth on mixed
/// wording; financial is the default, checked last.
pub fn classify_category(text: &str) -> NewsCategory {
    let lowered = text.to_lowercase();
    if RISK_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        NewsCategory::Risk
    } else if GROWTH_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        NewsCategory::Growth
    } else {
        NewsCategory::Financial
    }
}

/// Scans free-form content for tweet-like or bulleted news fragments and
/// yields categorized short-form items.
pub struct NewsExtractor<'a> {
    picker: &'a dyn TimestampPicker,
}

impl<'a> NewsExtractor<'a> {
    pub fn new(picker: &'a dyn TimestampPicker) -> Self {
        Self { picker }
    }

    /// Collect candidate fragments from every quoted-fragment pattern
    /// cumulatively; only when none match fall back to bulleted lines inside
    /// news-like sections.
    pub fn extract(&self, content: &str) -> Vec<NewsItem> {
        let mut candidates = quoted_fragments(content);
        if candidates.is_empty() {
            candidates = news_section_bullets(content);
        }

        let generated_at = Utc::now().timestamp_millis();
        let mut items = Vec::new();
        for (index, raw) in candidates.iter().enumerate() {
            let text = strip_markup(raw);
            if text.is_empty() {
                continue;
            }
            let category = classify_category(&text);
            let timestamp = EXPLICIT_TIMESTAMP
                .find(raw)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| self.picker.pick());
            items.push(NewsItem {
                id: format!("{}-{}-{}", category.as_str(), generated_at, index),
                content: text,
                category,
                timestamp,
            });
        }
        items
    }
}

/// Tweet-marker patterns, collected cumulatively across the whole content
fn quoted_fragments(content: &str) -> Vec<String> {
    let mut found = Vec::new();

    for line in content.lines() {
        if line.contains(BIRD_GLYPH) {
            let text: String = line.replace(BIRD_GLYPH, "");
            push_unique(&mut found, text.trim());
        } else if let Some(caps) = TWEET_LABEL.captures(line) {
            push_unique(&mut found, caps[1].trim());
        }
    }

    for caps in BOLD_QUOTED.captures_iter(content) {
        push_unique(&mut found, caps[1].trim());
    }

    found
}

/// Secondary heuristic: bulleted lines inside sections whose heading mentions
/// news, tweets, or updates.
fn news_section_bullets(content: &str) -> Vec<String> {
    let mut found = Vec::new();
    for keyword in NEWS_SECTION_KEYWORDS {
        for section in sections::locate(content, keyword) {
            for line in section.lines() {
                let trimmed = line.trim_start();
                if let Some(rest) = BULLET_GLYPHS
                    .iter()
                    .find_map(|glyph| trimmed.strip_prefix(glyph))
                {
                    push_unique(&mut found, rest.trim());
                }
            }
        }
    }
    found
}

fn push_unique(found: &mut Vec<String>, candidate: &str) {
    if !candidate.is_empty() && !found.iter().any(|existing| existing == candidate) {
        found.push(candidate.to_string());
    }
}
