//! Core domain types: the user's selection and the enums it is built from.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{InstructGenError, Result};

/// Uppercase a user-supplied name and turn kebab-case into the wire form.
fn normalize_name(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

// ---------------------------------------------------------------------------
// ProjectType
// ---------------------------------------------------------------------------

/// Kind of project the instructions are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectType {
    SimpleScript,
    WebApplication,
    ApiBackend,
    DataAnalysis,
    Custom,
}

impl ProjectType {
    pub const ALL: [Self; 5] = [
        Self::SimpleScript,
        Self::WebApplication,
        Self::ApiBackend,
        Self::DataAnalysis,
        Self::Custom,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::SimpleScript => "SIMPLE_SCRIPT",
            Self::WebApplication => "WEB_APPLICATION",
            Self::ApiBackend => "API_BACKEND",
            Self::DataAnalysis => "DATA_ANALYSIS",
            Self::Custom => "CUSTOM",
        }
    }
}

impl FromStr for ProjectType {
    type Err = InstructGenError;

    fn from_str(s: &str) -> Result<Self> {
        let name = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|v| v.wire_name() == name)
            .ok_or_else(|| InstructGenError::validation(format!("unknown project type '{s}'")))
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// OperatingSystem
// ---------------------------------------------------------------------------

/// Development operating system. Unrecognized names fall back to Linux when
/// deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperatingSystem {
    Linux,
    MacOs,
    Windows,
    MultiPlatform,
}

impl OperatingSystem {
    pub const ALL: [Self; 4] = [Self::Linux, Self::MacOs, Self::Windows, Self::MultiPlatform];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Linux => "LINUX",
            Self::MacOs => "MACOS",
            Self::Windows => "WINDOWS",
            Self::MultiPlatform => "MULTI_PLATFORM",
        }
    }

    fn lookup(s: &str) -> Option<Self> {
        let name = normalize_name(s);
        Self::ALL.into_iter().find(|v| v.wire_name() == name)
    }
}

impl From<String> for OperatingSystem {
    fn from(s: String) -> Self {
        Self::lookup(&s).unwrap_or_else(|| {
            warn!(value = %s, "unrecognized operating system, using LINUX");
            Self::Linux
        })
    }
}

impl From<OperatingSystem> for String {
    fn from(os: OperatingSystem) -> Self {
        os.wire_name().to_string()
    }
}

impl FromStr for OperatingSystem {
    type Err = InstructGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| {
            InstructGenError::validation(format!("unknown operating system '{s}'"))
        })
    }
}

impl std::fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Target programming language. Unrecognized names deserialize as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    HtmlCss,
    CSharp,
    Go,
    Rust,
    Other,
}

impl Language {
    pub const ALL: [Self; 9] = [
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Java,
        Self::HtmlCss,
        Self::CSharp,
        Self::Go,
        Self::Rust,
        Self::Other,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Python => "PYTHON",
            Self::JavaScript => "JAVASCRIPT",
            Self::TypeScript => "TYPESCRIPT",
            Self::Java => "JAVA",
            Self::HtmlCss => "HTML_CSS",
            Self::CSharp => "CSHARP",
            Self::Go => "GO",
            Self::Rust => "RUST",
            Self::Other => "OTHER",
        }
    }

    /// JavaScript and TypeScript gate the style-sheet feature.
    pub fn is_script(&self) -> bool {
        matches!(self, Self::JavaScript | Self::TypeScript)
    }

    fn lookup(s: &str) -> Option<Self> {
        let name = normalize_name(s);
        Self::ALL.into_iter().find(|v| v.wire_name() == name)
    }
}

impl From<String> for Language {
    fn from(s: String) -> Self {
        Self::lookup(&s).unwrap_or(Self::Other)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.wire_name().to_string()
    }
}

impl FromStr for Language {
    type Err = InstructGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
            .ok_or_else(|| InstructGenError::validation(format!("unknown language '{s}'")))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// Optional instruction features.
///
/// `Unknown` only arises from lenient deserialization; the composer skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Feature {
    DomainDrivenDesign,
    TestDrivenDevelopment,
    DocumentationRules,
    CodeQuality,
    ScssSupport,
    Unknown,
}

impl Feature {
    /// Every feature a user can pick (excludes `Unknown`).
    pub const ALL: [Self; 5] = [
        Self::DomainDrivenDesign,
        Self::TestDrivenDevelopment,
        Self::DocumentationRules,
        Self::CodeQuality,
        Self::ScssSupport,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::DomainDrivenDesign => "DOMAIN_DRIVEN_DESIGN",
            Self::TestDrivenDevelopment => "TEST_DRIVEN_DEVELOPMENT",
            Self::DocumentationRules => "DOCUMENTATION_RULES",
            Self::CodeQuality => "CODE_QUALITY",
            Self::ScssSupport => "SCSS_SUPPORT",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn lookup(s: &str) -> Option<Self> {
        let name = normalize_name(s);
        Self::ALL.into_iter().find(|v| v.wire_name() == name)
    }
}

impl From<String> for Feature {
    fn from(s: String) -> Self {
        Self::lookup(&s).unwrap_or_else(|| {
            warn!(value = %s, "unrecognized feature will be skipped");
            Self::Unknown
        })
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.wire_name().to_string()
    }
}

impl FromStr for Feature {
    type Err = InstructGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
            .ok_or_else(|| InstructGenError::validation(format!("unknown feature '{s}'")))
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A validated set of user choices driving one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub project_name: String,
    pub project_description: String,
    pub project_type: ProjectType,
    pub operating_system: OperatingSystem,
    /// Languages in the order the user picked them.
    pub languages: Vec<Language>,
    /// Features in the order the user picked them.
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Selection {
    /// Whether any script-like language (JavaScript/TypeScript) is selected.
    pub fn has_script_language(&self) -> bool {
        self.languages.iter().any(Language::is_script)
    }
}

/// Raw form input, before the validation gate.
///
/// Every scalar may be missing; language and feature lists may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// User-facing alert raised by the validation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationAlert {
    /// Name, description, project type or operating system is missing.
    #[error("Please fill in all required fields.")]
    MissingRequiredFields,
    /// No language was selected.
    #[error("Select at least one programming language.")]
    NoLanguages,
}

impl SelectionInput {
    /// Lay `other` over `self`: present scalars and non-empty lists in
    /// `other` win.
    pub fn overlay(mut self, other: SelectionInput) -> Self {
        if other.project_name.is_some() {
            self.project_name = other.project_name;
        }
        if other.project_description.is_some() {
            self.project_description = other.project_description;
        }
        if other.project_type.is_some() {
            self.project_type = other.project_type;
        }
        if other.operating_system.is_some() {
            self.operating_system = other.operating_system;
        }
        if !other.languages.is_empty() {
            self.languages = other.languages;
        }
        if !other.features.is_empty() {
            self.features = other.features;
        }
        self
    }

    /// Run the validation gate. Duplicate languages and features keep their
    /// first position.
    pub fn validate(self) -> std::result::Result<Selection, ValidationAlert> {
        let name = non_blank(self.project_name);
        let description = non_blank(self.project_description);

        let (Some(project_name), Some(project_description), Some(project_type), Some(os)) =
            (name, description, self.project_type, self.operating_system)
        else {
            return Err(ValidationAlert::MissingRequiredFields);
        };

        if self.languages.is_empty() {
            return Err(ValidationAlert::NoLanguages);
        }

        Ok(Selection {
            project_name,
            project_description,
            project_type,
            operating_system: os,
            languages: dedup_in_order(self.languages),
            features: dedup_in_order(self.features),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn dedup_in_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Read a selection file. `.json` files are parsed as JSON, anything else
/// as TOML.
pub fn load_selection_from(path: &Path) -> Result<SelectionInput> {
    let content = std::fs::read_to_string(path).map_err(|e| InstructGenError::io(path, e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| {
            InstructGenError::parse(format!("failed to parse {}: {e}", path.display()))
        })
    } else {
        toml::from_str(&content).map_err(|e| {
            InstructGenError::parse(format!("failed to parse {}: {e}", path.display()))
        })
    }
}
