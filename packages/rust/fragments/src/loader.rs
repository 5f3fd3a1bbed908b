//! Fragment loader: fetch-once, never-fail access to remote fragments.
//!
//! A failed fetch does not abort generation. The loader returns an inline
//! HTML comment describing the failure instead, and the document is still
//! produced around it.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use instructgen_markdown::html_comment;
use instructgen_shared::{InstructGenError, Result, SourceConfig};

use crate::cache::FragmentCache;
use crate::resolver::DeploymentContext;

/// Maximum number of redirects to follow for one fragment.
const MAX_REDIRECTS: usize = 3;

/// Default maximum fragment size (2 MB).
const MAX_FRAGMENT_SIZE: usize = 2 * 1024 * 1024;

/// User-Agent string for fragment requests.
const USER_AGENT: &str = concat!("instructgen/", env!("CARGO_PKG_VERSION"));

/// HTTP settings for the loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Per-request timeout in seconds. Zero disables the timeout.
    pub timeout_secs: u64,
    /// Largest fragment body accepted, with or without a `Content-Length`.
    pub max_fragment_bytes: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_fragment_bytes: MAX_FRAGMENT_SIZE,
        }
    }
}

impl From<&SourceConfig> for LoaderOptions {
    fn from(source: &SourceConfig) -> Self {
        Self {
            timeout_secs: source.timeout_secs,
            ..Self::default()
        }
    }
}

/// Loads fragment text relative to a base URL, caching successes.
#[derive(Debug)]
pub struct FragmentLoader {
    client: Client,
    base_url: Url,
    context: DeploymentContext,
    cache: FragmentCache,
    max_fragment_bytes: usize,
}

impl FragmentLoader {
    /// Create a loader with an empty cache.
    ///
    /// `base_url` is treated as a directory even without a trailing `/`.
    pub fn new(base_url: &str, context: DeploymentContext, opts: &LoaderOptions) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            InstructGenError::config(format!("invalid fragment base URL '{normalized}': {e}"))
        })?;

        Ok(Self {
            client: build_client(opts)?,
            base_url,
            context,
            cache: FragmentCache::new(),
            max_fragment_bytes: opts.max_fragment_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    /// Absolute URL of a fragment. A leading `/` on `relative_path` is ignored.
    pub fn absolute_url(&self, relative_path: &str) -> Result<Url> {
        self.base_url
            .join(relative_path.trim_start_matches('/'))
            .map_err(|e| InstructGenError::parse(format!("bad fragment path '{relative_path}': {e}")))
    }

    /// Load a fragment. Never fails: fetch errors come back as a diagnostic
    /// comment naming the URL, some troubleshooting steps, and the cause.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn load(&self, relative_path: &str) -> String {
        let url = match self.absolute_url(relative_path) {
            Ok(url) => url,
            Err(e) => {
                let attempted = format!("{}{relative_path}", self.base_url);
                warn!(url = %attempted, error = %e, "fragment path could not be resolved");
                return render_diagnostic(&attempted, &self.context, &e.to_string());
            }
        };

        debug!(
            relative_path,
            %url,
            host = %self.context.host,
            path = %self.context.path,
            "loading fragment"
        );

        if let Some(text) = self.cache.get(url.as_str()).await {
            debug!(%url, "fragment cache hit");
            self.cache.record_hit();
            return text;
        }

        let gate = self.cache.gate(url.as_str()).await;
        let _guard = gate.lock().await;

        // Another load of the same URL may have finished while we waited.
        if let Some(text) = self.cache.get(url.as_str()).await {
            debug!(%url, "fragment cache hit after wait");
            self.cache.record_hit();
            return text;
        }

        self.cache.record_miss();
        match fetch_text(&self.client, &url, self.max_fragment_bytes).await {
            Ok(text) => {
                self.cache.insert(url.as_str(), text.clone()).await;
                info!(relative_path, bytes = text.len(), "fragment loaded");
                text
            }
            Err(e) => {
                warn!(%url, error = %e, "fragment loading failed");
                render_diagnostic(url.as_str(), &self.context, &e.to_string())
            }
        }
    }
}

/// Render the inline comment that replaces a fragment that failed to load.
pub fn render_diagnostic(url: &str, context: &DeploymentContext, error: &str) -> String {
    let troubleshooting = if context.is_loopback() {
        format!(
            "Troubleshooting (local development):\n\
             1. Check that the fragment directory exists in the served tree\n\
             2. Check that the local server was started from the project root\n\
             3. Path: {url}"
        )
    } else {
        format!(
            "Troubleshooting (hosted deployment):\n\
             1. Check that the repository is public\n\
             2. Check that the branch is main or master\n\
             3. Check that the file exists: {url}\n\
             4. Current page: {}",
            context.page_url()
        )
    };

    html_comment(&format!(
        "Template loading error: {url}\n\n{troubleshooting}\n\nError details: {error}\n"
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &LoaderOptions) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

    if opts.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(opts.timeout_secs));
    }

    builder
        .build()
        .map_err(|e| InstructGenError::Network(format!("failed to build HTTP client: {e}")))
}

/// GET a fragment and return its body as text, reading at most `max_bytes`.
async fn fetch_text(client: &Client, url: &Url, max_bytes: usize) -> Result<String> {
    let mut response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| InstructGenError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InstructGenError::Network(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes as u64 {
            return Err(too_large(url, len, max_bytes));
        }
    }

    // Chunked responses carry no length, so the limit is also enforced while reading.
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| InstructGenError::Network(format!("{url}: failed to read body: {e}")))?
    {
        let len = body.len() + chunk.len();
        if len > max_bytes {
            return Err(too_large(url, len as u64, max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    String::from_utf8(body)
        .map_err(|e| InstructGenError::parse(format!("{url}: fragment is not UTF-8: {e}")))
}

fn too_large(url: &Url, len: u64, max_bytes: usize) -> InstructGenError {
    InstructGenError::validation(format!(
        "{url}: fragment too large (at least {len} bytes, max {max_bytes})"
    ))
}
