//! Application configuration for instructgen.
//!
//! User config lives at `~/.instructgen/instructgen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InstructGenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "instructgen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".instructgen";

// ---------------------------------------------------------------------------
// Config structs (matching instructgen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where fragments are fetched from.
    #[serde(default)]
    pub source: SourceConfig,

    /// The deployment the generator pretends to run under.
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Relative fragment paths.
    #[serde(default)]
    pub fragments: FragmentPaths,

    /// Section headings extracted from the common guidelines.
    #[serde(default)]
    pub sections: SectionNames,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Fixed fragment base URL. When set, location resolution is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Account used for custom-domain deployments.
    #[serde(default = "default_account")]
    pub account: String,

    /// Repository name used when none can be derived from the path.
    #[serde(default = "default_repo")]
    pub default_repo: String,

    /// Branch the fragments are read from.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Directory inside the repository holding the fragments.
    #[serde(default = "default_template_root")]
    pub template_root: String,

    /// Origin serving raw repository files.
    #[serde(default = "default_raw_origin")]
    pub raw_origin: String,

    /// Host-name suffix identifying the hosting platform.
    #[serde(default = "default_hosting_suffix")]
    pub hosting_suffix: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            account: default_account(),
            default_repo: default_repo(),
            branch: default_branch(),
            template_root: default_template_root(),
            raw_origin: default_raw_origin(),
            hosting_suffix: default_hosting_suffix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_account() -> String {
    "Yulikepython".into()
}
fn default_repo() -> String {
    "ai-coding-assistant-instructions-generator".into()
}
fn default_branch() -> String {
    "main".into()
}
fn default_template_root() -> String {
    "copilot-instructions-templates".into()
}
fn default_raw_origin() -> String {
    "https://raw.githubusercontent.com".into()
}
fn default_hosting_suffix() -> String {
    ".github.io".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[deployment]` section: host name and page path of the generator page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            path: default_path(),
        }
    }
}

fn default_host() -> String {
    "yulikepython.github.io".into()
}
fn default_path() -> String {
    "/ai-coding-assistant-instructions-generator/".into()
}

/// `[fragments]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentPaths {
    #[serde(default = "default_common_guidelines")]
    pub common_guidelines: String,
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_javascript")]
    pub javascript: String,
    #[serde(default = "default_java")]
    pub java: String,
    #[serde(default = "default_html_css")]
    pub html_css: String,
    #[serde(default = "default_generic")]
    pub generic: String,
    #[serde(default = "default_scss")]
    pub scss: String,
}

impl Default for FragmentPaths {
    fn default() -> Self {
        Self {
            common_guidelines: default_common_guidelines(),
            python: default_python(),
            javascript: default_javascript(),
            java: default_java(),
            html_css: default_html_css(),
            generic: default_generic(),
            scss: default_scss(),
        }
    }
}

fn default_common_guidelines() -> String {
    "/core/common-guidelines.md".into()
}
fn default_python() -> String {
    "/languages/python-addon.md".into()
}
fn default_javascript() -> String {
    "/languages/javascript-typescript-addon.md".into()
}
fn default_java() -> String {
    "/languages/java-addon.md".into()
}
fn default_html_css() -> String {
    "/languages/html-css-addon.md".into()
}
fn default_generic() -> String {
    "/languages/generic-addon.md".into()
}
fn default_scss() -> String {
    "/languages/scss-addon.md".into()
}

/// `[sections]` section: `##` headings pulled out of the common guidelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionNames {
    #[serde(default = "default_core_section")]
    pub core_guidelines: String,
    #[serde(default = "default_ddd_section")]
    pub domain_driven_design: String,
    #[serde(default = "default_docs_section")]
    pub documentation_rules: String,
}

impl Default for SectionNames {
    fn default() -> Self {
        Self {
            core_guidelines: default_core_section(),
            domain_driven_design: default_ddd_section(),
            documentation_rules: default_docs_section(),
        }
    }
}

fn default_core_section() -> String {
    "汎用ガイドライン（全プロジェクト共通）".into()
}
fn default_ddd_section() -> String {
    "ドメイン駆動設計の基本原則".into()
}
fn default_docs_section() -> String {
    "ドキュメント作成ルール".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suggested file name for the generated document.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

fn default_file_name() -> String {
    "copilot-instructions.md".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.instructgen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InstructGenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.instructgen/instructgen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InstructGenError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        InstructGenError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InstructGenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    write_default_config(&path)?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Write the default config as pretty TOML to `path`.
pub fn write_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| InstructGenError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| InstructGenError::io(path, e))
}
