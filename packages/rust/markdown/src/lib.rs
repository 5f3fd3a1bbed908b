//! Markdown helpers for instruction documents.
//!
//! Fragments are treated as opaque text: this crate only slices them by
//! heading, joins finished blocks, and renders inline comments.

mod section;

pub use section::{extract_section, list_sections};

/// Separator placed between composed blocks (one blank line).
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Join blocks with [`BLOCK_SEPARATOR`], dropping empty and whitespace-only ones.
pub fn join_blocks<I, S>(blocks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kept: Vec<S> = blocks
        .into_iter()
        .filter(|block| !block.as_ref().trim().is_empty())
        .collect();

    let mut out = String::new();
    for (i, block) in kept.iter().enumerate() {
        if i > 0 {
            out.push_str(BLOCK_SEPARATOR);
        }
        out.push_str(block.as_ref());
    }
    out
}

/// Wrap `body` in an HTML comment so it stays invisible when rendered.
///
/// A `-->` inside the body would close the comment early, so it is defused.
pub fn html_comment(body: &str) -> String {
    format!("<!-- {} -->", body.replace("-->", "-- >"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_blank_blocks() {
        let joined = join_blocks(["# Head", "", "  \n ", "body"]);
        assert_eq!(joined, "# Head\n\nbody");
    }

    #[test]
    fn join_of_nothing_is_empty() {
        let blocks: Vec<String> = Vec::new();
        assert_eq!(join_blocks(blocks), "");
    }

    #[test]
    fn join_keeps_block_content_verbatim() {
        let joined = join_blocks(vec!["a\n".to_string(), "\nb".to_string()]);
        assert_eq!(joined, "a\n\n\n\nb");
    }

    #[test]
    fn comment_wraps_and_defuses_terminator() {
        let comment = html_comment("failed --> retry\nline two");
        assert!(comment.starts_with("<!-- "));
        assert!(comment.ends_with(" -->"));
        assert_eq!(comment.matches("-->").count(), 1);
        assert!(comment.contains("line two"));
    }
}
