//! Language → addon fragment mapping.

use instructgen_shared::{FragmentPaths, Language};

/// Addon fragment for `language`. JavaScript and TypeScript share one addon;
/// languages without a dedicated addon get the generic one.
pub fn addon_fragment(language: Language, paths: &FragmentPaths) -> &str {
    match language {
        Language::Python => &paths.python,
        Language::JavaScript | Language::TypeScript => &paths.javascript,
        Language::Java => &paths.java,
        Language::HtmlCss => &paths.html_css,
        Language::CSharp | Language::Go | Language::Rust | Language::Other => &paths.generic,
    }
}
