//! Heading-delimited section extraction.
//!
//! A section starts at a `## Name` line and runs up to, not including, the
//! next `##` heading. `###` subsections stay inside their parent.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Marker that opens a second-level heading.
const H2_MARKER: &str = "## ";

/// Marker that opens a third-level heading.
const H3_MARKER: &str = "### ";

/// Matches `## Section Title` (after trimming).
static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.+)$").expect("H2 regex"));

/// Return the slice of `content` from the first `## <section_name>` line up to
/// the next second-level heading.
///
/// Returns an empty string when no heading matches. The heading match is a
/// prefix match on the trimmed line, so `## Rules` also matches
/// `## Rules (all projects)`.
pub fn extract_section(content: &str, section_name: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let start_marker = format!("{H2_MARKER}{section_name}");

    let Some(start) = lines
        .iter()
        .position(|line| line.trim().starts_with(&start_marker))
    else {
        debug!(section_name, "section heading not found");
        return String::new();
    };

    let end = lines[start + 1..]
        .iter()
        .position(|line| is_h2(line))
        .map_or(lines.len(), |offset| start + 1 + offset);

    lines[start..end].join("\n")
}

/// List the titles of all second-level headings, in document order.
pub fn list_sections(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| is_h2(line))
        .filter_map(|line| H2_RE.captures(line.trim()).map(|caps| caps[1].trim().to_string()))
        .collect()
}

fn is_h2(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with(H2_MARKER) && !trimmed.starts_with(H3_MARKER)
}
