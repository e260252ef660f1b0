use insight_core::{InsightRow, MAX_ROWS_PER_CATEGORY};
use regex::Regex;
use std::sync::LazyLock;

use crate::trend;

static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").unwrap());

/// Alignment/separator row under a markdown table header, e.g. `|---|:---:|`
static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|[\s:|\-]+\|\s*$").unwrap());

/// Bullet glyphs seen across model output revisions. `*` and `-` require a
/// trailing space so emphasis markers and horizontal rules don't match.
const BULLET_GLYPHS: &[&str] = &["•", "✅", "➡️", "👉", "✓", "* ", "- "];

/// Strip bold/emphasis markup and surrounding noise from an extracted cell.
pub(crate) fn strip_markup(text: &str) -> String {
    text.replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .to_string()
}

/// Extract insight rows from one content section, capped at
/// `MAX_ROWS_PER_CATEGORY`. Strategies run in priority order and the first
/// non-empty result wins; a section with zero matching lines yields an empty
/// list, which callers treat as "no data for this category", not an error.
pub fn extract(section: &str) -> Vec<InsightRow> {
    let strategies: [fn(&str) -> Vec<InsightRow>; 2] = [markdown_table_rows, bulleted_rows];
    for strategy in strategies {
        let mut rows = strategy(section);
        if !rows.is_empty() {
            rows.truncate(MAX_ROWS_PER_CATEGORY);
            return rows;
        }
    }
    Vec::new()
}

/// Markdown-table mode: pipe-delimited rows with the header row and the
/// separator row skipped. Requires at least metric and value cells; a third
/// cell, when present, is the change/trend signal.
fn markdown_table_rows(section: &str) -> Vec<InsightRow> {
    let table_lines: Vec<&str> = section
        .lines()
        .filter(|line| TABLE_ROW.is_match(line))
        .collect();
    if table_lines.len() < 2 {
        return Vec::new();
    }

    let data_start = if table_lines.len() > 1 && TABLE_SEPARATOR.is_match(table_lines[1]) {
        2
    } else {
        1
    };

    let mut rows = Vec::new();
    for line in &table_lines[data_start.min(table_lines.len())..] {
        let mut cells: Vec<String> = line.split('|').map(strip_markup).collect();
        // the leading and trailing pipes produce empty edge cells; interior
        // cells stay positional so a blank value can't swallow the change
        if cells.first().is_some_and(String::is_empty) {
            cells.remove(0);
        }
        if cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }
        if cells.len() < 2 || cells[0].is_empty() {
            continue;
        }
        let value = if cells[1].is_empty() {
            "N/A".to_string()
        } else {
            cells[1].clone()
        };
        let change = cells.get(2).cloned().filter(|cell| !cell.is_empty());
        rows.push(InsightRow {
            metric: cells[0].clone(),
            value,
            trend: trend::classify(change.as_deref()),
            change,
        });
    }
    rows
}

/// Bulleted key:value mode: lines opening with a bullet glyph, split on the
/// first colon. Lines without a colon become the value under a synthesized
/// "Key Point N" metric.
fn bulleted_rows(section: &str) -> Vec<InsightRow> {
    let mut rows = Vec::new();
    for line in section.lines() {
        let trimmed = line.trim_start();
        let Some(rest) = BULLET_GLYPHS
            .iter()
            .find_map(|glyph| trimmed.strip_prefix(glyph))
        else {
            continue;
        };

        let rest = rest.trim();
        if rest.is_empty() {
            continue;
        }

        let (metric, value) = match rest.split_once(':') {
            Some((metric, value)) => {
                let metric = strip_markup(metric);
                let value = strip_markup(value);
                if metric.is_empty() {
                    (format!("Key Point {}", rows.len() + 1), value)
                } else {
                    (metric, value)
                }
            }
            None => (format!("Key Point {}", rows.len() + 1), strip_markup(rest)),
        };

        let value = if value.is_empty() {
            "N/A".to_string()
        } else {
            value
        };

        rows.push(InsightRow {
            metric,
            trend: trend::classify(Some(&value)),
            value,
            change: None,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::Trend;

    #[test]
    fn two_column_table_yields_neutral_row() {
        let section = "| Metric | Value |\n|--------|-------|\n| Revenue | $2B |";
        let rows = extract(section);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric, "Revenue");
        assert_eq!(rows[0].value, "$2B");
        assert_eq!(rows[0].change, None);
        assert_eq!(rows[0].trend, Trend::Neutral);
    }

    #[test]
    fn third_column_feeds_trend_classifier() {
        let section = "\
| Metric | Value | Change |
|--------|-------|--------|
| Revenue | $2B | +5% |
| Margin | 23% | declining |";
        let rows = extract(section);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].change.as_deref(), Some("+5%"));
        assert_eq!(rows[0].trend, Trend::Up);
        assert_eq!(rows[1].trend, Trend::Down);
    }

    #[test]
    fn bold_markup_is_stripped_from_cells() {
        let section = "| Metric | Value |\n|---|---|\n| **Revenue** | **$2B** |";
        let rows = extract(section);
        assert_eq!(rows[0].metric, "Revenue");
        assert_eq!(rows[0].value, "$2B");
    }

    #[test]
    fn bulleted_key_value_lines() {
        let section = "- Revenue: $5M\n- Net Income: $1M";
        let rows = extract(section);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].metric, "Revenue");
        assert_eq!(rows[0].value, "$5M");
        assert_eq!(rows[1].metric, "Net Income");
        assert_eq!(rows[1].value, "$1M");
    }

    #[test]
    fn emoji_bullets_are_recognized() {
        let section = "✅ EPS: $3.10\n👉 Operating Margin: 24%\n• Cash Flow: $2B";
        let rows = extract(section);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].metric, "EPS");
        assert_eq!(rows[1].metric, "Operating Margin");
        assert_eq!(rows[2].metric, "Cash Flow");
    }

    #[test]
    fn bullet_without_colon_becomes_key_point() {
        let section = "- Strong quarter overall\n- Revenue: $5M";
        let rows = extract(section);
        assert_eq!(rows[0].metric, "Key Point 1");
        assert_eq!(rows[0].value, "Strong quarter overall");
        assert_eq!(rows[1].metric, "Revenue");
    }

    #[test]
    fn blank_value_cell_keeps_change_in_place() {
        let section = "\
| Metric | Value | Change |
|--------|-------|--------|
| Revenue | | +5% |";
        let rows = extract(section);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric, "Revenue");
        assert_eq!(rows[0].value, "N/A");
        assert_eq!(rows[0].change.as_deref(), Some("+5%"));
        assert_eq!(rows[0].trend, Trend::Up);
    }

    #[test]
    fn table_mode_wins_over_bullets() {
        let section = "- Revenue: $5M\n| Metric | Value |\n|---|---|\n| EPS | $3 |";
        let rows = extract(section);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric, "EPS");
    }

    #[test]
    fn rows_are_capped_at_five() {
        let section = "\
- A: 1
- B: 2
- C: 3
- D: 4
- E: 5
- F: 6
- G: 7";
        let rows = extract(section);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].metric, "E");
    }

    #[test]
    fn empty_section_yields_empty_list() {
        assert!(extract("").is_empty());
        assert!(extract("no structure here at all").is_empty());
    }
}
