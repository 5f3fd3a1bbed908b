//! Fragment location resolution, caching, and loading.
//!
//! Fragments are Markdown files kept in a repository's template directory and
//! served by a raw-file origin. This crate works out where that directory is
//! for a given deployment ([`resolve_base_url`]), and fetches fragments from
//! it through a [`FragmentLoader`] that caches every successful fetch in its
//! [`FragmentCache`].

mod cache;
mod loader;
mod resolver;

pub use cache::FragmentCache;
pub use loader::{FragmentLoader, LoaderOptions, render_diagnostic};
pub use resolver::{DeploymentContext, effective_base_url, resolve_base_url};
