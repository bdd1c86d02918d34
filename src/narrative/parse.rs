//! Parsing of free-form model output into summary and suggestions.

use std::sync::LazyLock;

use regex::Regex;

/// `1.`, `2)`, `- `, `* `, `• ` list markers. Bullets need a following space
/// so `**bold**` headings are not taken as items.
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[.)]\s*|[-*•]\s+)").expect("valid list item regex"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]").expect("valid numbered item regex"));

/// Splits model text into summary text and suggestion lines.
///
/// Lines are summary until one mentions "suggestion" or starts a numbered list;
/// from then on every list item is a suggestion, with its marker stripped.
/// Non-list lines inside the suggestions block are dropped. Markdown emphasis
/// (`**`) is removed from suggestions.
pub(crate) fn parse_model_text(text: &str) -> (String, Vec<String>) {
    let mut summary_lines = Vec::new();
    let mut suggestions = Vec::new();
    let mut in_suggestions = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.to_lowercase().contains("suggestion") || NUMBERED.is_match(line) {
            in_suggestions = true;
        }

        if in_suggestions {
            if let Some(marker) = LIST_ITEM.find(line) {
                let item = line[marker.end()..].replace("**", "");
                let item = item.trim();
                if !item.is_empty() {
                    suggestions.push(item.to_string());
                }
            }
        } else {
            summary_lines.push(line);
        }
    }

    (summary_lines.join(" "), suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_then_numbered_suggestions() {
        let text = "Your site is fairly light.\n\
                    It emits about 0.3g per visit.\n\
                    \n\
                    Suggestions:\n\
                    1. Compress hero images\n\
                    2.  Defer third-party scripts \n\
                    3) Serve fonts locally";
        let (summary, suggestions) = parse_model_text(text);
        assert_eq!(
            summary,
            "Your site is fairly light. It emits about 0.3g per visit."
        );
        assert_eq!(
            suggestions,
            vec![
                "Compress hero images",
                "Defer third-party scripts",
                "Serve fonts locally"
            ]
        );
    }

    #[test]
    fn test_bullets_after_heading() {
        let text = "Summary line.\n**Suggestions for improvement**\n- **Lazy-load** images\n• Use a CDN\n* Trim CSS";
        let (summary, suggestions) = parse_model_text(text);
        assert_eq!(summary, "Summary line.");
        assert_eq!(suggestions, vec!["Lazy-load images", "Use a CDN", "Trim CSS"]);
    }

    #[test]
    fn test_numbered_line_starts_block_without_heading() {
        let text = "Short summary.\n1. First tip\nA stray sentence.\n2. Second tip";
        let (summary, suggestions) = parse_model_text(text);
        assert_eq!(summary, "Short summary.");
        assert_eq!(suggestions, vec!["First tip", "Second tip"]);
    }

    #[test]
    fn test_bullets_before_block_stay_in_summary() {
        let text = "- a dash line before any heading\nNo list here.";
        let (summary, suggestions) = parse_model_text(text);
        assert_eq!(summary, "- a dash line before any heading No list here.");
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let (summary, suggestions) = parse_model_text("  \n\n ");
        assert!(summary.is_empty());
        assert!(suggestions.is_empty());
    }
}
