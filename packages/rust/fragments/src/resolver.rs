//! Fragment origin resolution.
//!
//! The generator page is either served from a hosting platform
//! (`<account>.github.io/<repo>/...`) or from a custom domain. Either way the
//! fragments live in the repository's template root on the raw-file origin.

use instructgen_shared::{DeploymentConfig, SourceConfig};

/// Path segment marking a page served from the repository's `docs/` folder.
const DOCS_MARKER: &str = "docs";

/// Host name and page path the generator runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    pub host: String,
    pub path: String,
}

impl DeploymentContext {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Whether the page is served from the local machine.
    pub fn is_loopback(&self) -> bool {
        self.host == "localhost" || self.host == "127.0.0.1"
    }

    /// Full URL of the generator page.
    pub fn page_url(&self) -> String {
        let scheme = if self.is_loopback() { "http" } else { "https" };
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("{scheme}://{}{path}", self.host)
    }
}

impl From<&DeploymentConfig> for DeploymentContext {
    fn from(config: &DeploymentConfig) -> Self {
        Self::new(&config.host, &config.path)
    }
}

/// Resolve the fragment base URL for a deployment. Always ends with `/`.
pub fn resolve_base_url(context: &DeploymentContext, source: &SourceConfig) -> String {
    let segments: Vec<&str> = context.path.split('/').filter(|s| !s.is_empty()).collect();

    let (account, repo) = if context.host.ends_with(&source.hosting_suffix) {
        let account = context.host.split('.').next().unwrap_or_default();
        (account.to_string(), hosted_repo_name(&segments, &source.default_repo))
    } else {
        let repo = segments
            .first()
            .map_or_else(|| source.default_repo.clone(), |s| (*s).to_string());
        (source.account.clone(), repo)
    };

    format!(
        "{}/{account}/{repo}/{}/{}/",
        source.raw_origin.trim_end_matches('/'),
        source.branch,
        source.template_root.trim_matches('/'),
    )
}

/// Base URL to fetch from: the configured override, or the resolved origin.
pub fn effective_base_url(context: &DeploymentContext, source: &SourceConfig) -> String {
    match source.base_url.as_deref() {
        Some(url) if url.ends_with('/') => url.to_string(),
        Some(url) => format!("{url}/"),
        None => resolve_base_url(context, source),
    }
}

/// Repository name for a page hosted at `<account>.github.io/<path>`.
fn hosted_repo_name(segments: &[&str], default_repo: &str) -> String {
    let mut repo = segments.first().copied().unwrap_or_default();

    let n = segments.len();
    if n >= 2 && segments[n - 2] == DOCS_MARKER {
        // `.../<repo>/docs/<page>`: the repository sits three from the end.
        repo = n
            .checked_sub(3)
            .map_or(segments[0], |i| segments[i]);
    }

    if repo.is_empty() || repo == DOCS_MARKER {
        default_repo.to_string()
    } else {
        repo.to_string()
    }
}
