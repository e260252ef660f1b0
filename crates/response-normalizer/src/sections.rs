use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*$").unwrap());

static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());

/// One delimited subrange of the raw content, scoped to a topical category.
#[derive(Debug, Clone)]
pub struct Section {
    /// Heading text when the section opened with a markdown heading
    pub heading: Option<String>,
    pub body: String,
}

/// Split content into sections delimited by markdown headings or horizontal
/// rules. Content with no delimiters at all comes back as a single section.
pub fn split_sections(content: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current_heading: Option<String> = None;
    let mut current_body: Vec<&str> = Vec::new();
    let mut started = false;

    fn flush(heading: &mut Option<String>, body: &mut Vec<&str>, out: &mut Vec<Section>) {
        let text = body.join("\n");
        if heading.is_some() || !text.trim().is_empty() {
            out.push(Section {
                heading: heading.take(),
                body: text,
            });
        }
        body.clear();
    }

    for line in content.lines() {
        if let Some(caps) = HEADING.captures(line) {
            if started {
                flush(&mut current_heading, &mut current_body, &mut sections);
            }
            current_heading = Some(caps[1].to_string());
            started = true;
        } else if HORIZONTAL_RULE.is_match(line) {
            if started {
                flush(&mut current_heading, &mut current_body, &mut sections);
            }
            current_heading = None;
            started = true;
        } else {
            current_body.push(line);
            started = true;
        }
    }
    flush(&mut current_heading, &mut current_body, &mut sections);

    sections
}

/// Return the body text of every section whose heading (or, for sections with
/// no heading, whose whole block) contains `keyword`, case-insensitively.
/// An empty result means callers should fall through to a secondary heuristic
/// before giving up on the category.
pub fn locate(content: &str, keyword: &str) -> Vec<String> {
    let needle = keyword.to_lowercase();
    split_sections(content)
        .into_iter()
        .filter(|section| match &section.heading {
            Some(heading) => heading.to_lowercase().contains(&needle),
            None => section.body.to_lowercase().contains(&needle),
        })
        .map(|section| section.body)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_headings() {
        let content = "## Financial Metrics\n- Revenue: $1B\n## Growth\n- YOY: 5%";
        let sections = split_sections(content);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading.as_deref(), Some("Financial Metrics"));
        assert!(sections[0].body.contains("Revenue"));
        assert_eq!(sections[1].heading.as_deref(), Some("Growth"));
    }

    #[test]
    fn splits_on_horizontal_rules() {
        let content = "first block\n---\nsecond block\n***\nthird block\n___\nfourth block";
        let sections = split_sections(content);
        assert_eq!(sections.len(), 4);
        assert!(sections.iter().all(|s| s.heading.is_none()));
    }

    #[test]
    fn rule_glyphs_do_not_mix() {
        // "-*-" is a decoration line, not a rule; it stays inside the block
        let content = "first block\n-*-\nstill first block";
        let sections = split_sections(content);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn undelimited_content_is_one_section() {
        let content = "just some text\nover two lines";
        let sections = split_sections(content);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, content);
    }

    #[test]
    fn locate_matches_heading_keyword_case_insensitively() {
        let content = "## FINANCIAL Overview\n- Revenue: $1B\n## Risks\n- Competition";
        let found = locate(content, "financial");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Revenue"));
    }

    #[test]
    fn locate_matches_delimiter_block_body() {
        let content = "intro\n---\nfinancial results were strong\n- Revenue: $1B";
        let found = locate(content, "financial");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Revenue"));
    }

    #[test]
    fn locate_returns_empty_when_nothing_matches() {
        let content = "## Growth\n- YOY: 5%";
        assert!(locate(content, "financial").is_empty());
    }
}
