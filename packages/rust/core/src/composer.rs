//! Document composer: selection → instruction document.
//!
//! Blocks are assembled in a fixed order:
//! header, environment, core guidelines, features, languages.
//! Feature and language blocks are fetched as concurrent batches and put back
//! in selection order.

use futures::future::join_all;
use tracing::{debug, error, info, instrument};

use instructgen_fragments::{DeploymentContext, FragmentLoader, LoaderOptions, effective_base_url};
use instructgen_markdown::{extract_section, join_blocks};
use instructgen_shared::{
    AppConfig, Feature, FragmentPaths, InstructGenError, Language, Result, SectionNames, Selection,
};

use crate::features::FeatureHandler;
use crate::languages::addon_fragment;
use crate::parts;

/// Message shown when generation fails for an unexpected reason.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Template generation failed. Reload and try again.";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Where a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    Environment,
    CoreGuidelines,
    Feature(Feature),
    Language(Language),
}

/// One piece of the composed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

/// The finished document: non-empty blocks in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedDocument {
    pub blocks: Vec<Block>,
}

impl ComposedDocument {
    /// Block kinds in output order.
    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(|b| b.kind).collect()
    }

    /// The document text, blocks separated by a blank line.
    pub fn text(&self) -> String {
        join_blocks(self.blocks.iter().map(|b| b.text.as_str()))
    }
}

impl std::fmt::Display for ComposedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Result of [`Composer::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Document(ComposedDocument),
    /// Generation failed; `message` is safe to show to the user.
    Failed { message: String },
}

/// Progress callback for reporting composer status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once generation has finished, successfully or not.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self) {}
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Assembles instruction documents from local parts and remote fragments.
///
/// The composer owns its [`FragmentLoader`], so every generation run on one
/// composer shares the loader's cache.
#[derive(Debug)]
pub struct Composer {
    loader: FragmentLoader,
    fragments: FragmentPaths,
    sections: SectionNames,
}

impl Composer {
    pub fn new(loader: FragmentLoader, fragments: FragmentPaths, sections: SectionNames) -> Self {
        Self {
            loader,
            fragments,
            sections,
        }
    }

    /// Build a composer for `context` from the application config.
    pub fn from_config(config: &AppConfig, context: DeploymentContext) -> Result<Self> {
        let base_url = effective_base_url(&context, &config.source);
        info!(%base_url, host = %context.host, "fragment base URL resolved");

        let loader = FragmentLoader::new(&base_url, context, &LoaderOptions::from(&config.source))?;
        Ok(Self::new(
            loader,
            config.fragments.clone(),
            config.sections.clone(),
        ))
    }

    pub fn loader(&self) -> &FragmentLoader {
        &self.loader
    }

    /// Generate the document for `selection`.
    ///
    /// Fragment failures are already folded into the document by the loader;
    /// anything else is logged and reported as [`GenerateOutcome::Failed`]
    /// without partial output.
    #[instrument(skip_all, fields(project = %selection.project_name))]
    pub async fn generate(
        &self,
        selection: &Selection,
        progress: &dyn ProgressReporter,
    ) -> GenerateOutcome {
        let outcome = match self.compose(selection, progress).await {
            Ok(document) => {
                info!(blocks = document.blocks.len(), "document generated");
                GenerateOutcome::Document(document)
            }
            Err(e) => {
                error!(error = %e, "template generation failed");
                GenerateOutcome::Failed {
                    message: GENERATION_FAILED_MESSAGE.to_string(),
                }
            }
        };
        progress.done();
        outcome
    }

    /// Assemble all blocks for `selection`.
    pub async fn compose(
        &self,
        selection: &Selection,
        progress: &dyn ProgressReporter,
    ) -> Result<ComposedDocument> {
        check_selection(selection)?;

        let mut blocks = vec![
            Block {
                kind: BlockKind::Header,
                text: parts::header(&selection.project_name, &selection.project_description),
            },
            Block {
                kind: BlockKind::Environment,
                text: parts::environment(selection.operating_system),
            },
        ];

        progress.phase("Loading core guidelines");
        let guidelines = self.loader.load(&self.fragments.common_guidelines).await;
        blocks.push(Block {
            kind: BlockKind::CoreGuidelines,
            text: extract_section(&guidelines, &self.sections.core_guidelines),
        });

        progress.phase("Loading feature sections");
        let feature_texts = join_all(
            selection
                .features
                .iter()
                .map(|feature| self.feature_block(*feature, selection)),
        )
        .await;
        for (feature, text) in selection.features.iter().zip(feature_texts) {
            if let Some(text) = text {
                blocks.push(Block {
                    kind: BlockKind::Feature(*feature),
                    text,
                });
            }
        }

        progress.phase("Loading language addons");
        let language_texts = join_all(
            selection
                .languages
                .iter()
                .map(|language| self.loader.load(addon_fragment(*language, &self.fragments))),
        )
        .await;
        for (language, text) in selection.languages.iter().zip(language_texts) {
            blocks.push(Block {
                kind: BlockKind::Language(*language),
                text,
            });
        }

        blocks.retain(|block| {
            let keep = !block.text.trim().is_empty();
            if !keep {
                debug!(kind = ?block.kind, "dropping empty block");
            }
            keep
        });

        Ok(ComposedDocument { blocks })
    }

    /// Text for one selected feature, or `None` when it contributes nothing.
    async fn feature_block(&self, feature: Feature, selection: &Selection) -> Option<String> {
        let Some(handler) = FeatureHandler::for_feature(feature) else {
            debug!(%feature, "feature has no handler, skipping");
            return None;
        };

        if handler.requires_script_language() && !selection.has_script_language() {
            debug!(%feature, "feature needs JavaScript or TypeScript, skipping");
            return None;
        }

        let content = match handler.fragment(&self.fragments) {
            Some(path) => self.loader.load(path).await,
            None => String::new(),
        };

        let text = match handler {
            FeatureHandler::GuidelineSection(section) => {
                extract_section(&content, section.heading(&self.sections))
            }
            FeatureHandler::CodeQualityRules => parts::CODE_QUALITY_RULES.to_string(),
            FeatureHandler::StyleSheetAddon => content,
        };
        Some(text)
    }
}

/// Reject selections that bypassed the validation gate.
fn check_selection(selection: &Selection) -> Result<()> {
    if selection.project_name.trim().is_empty() || selection.project_description.trim().is_empty() {
        return Err(InstructGenError::validation(
            "selection is missing the project name or description",
        ));
    }
    if selection.languages.is_empty() {
        return Err(InstructGenError::validation("selection has no languages"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use instructgen_shared::{OperatingSystem, ProjectType};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const FIXTURES: [&str; 7] = [
        "core/common-guidelines.md",
        "languages/python-addon.md",
        "languages/javascript-typescript-addon.md",
        "languages/java-addon.md",
        "languages/html-css-addon.md",
        "languages/generic-addon.md",
        "languages/scss-addon.md",
    ];

    fn fixture(name: &str) -> String {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/templates")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Serve every fixture except those in `skip`.
    async fn serve_fixtures(server: &MockServer, skip: &[&str]) {
        for name in FIXTURES.iter().filter(|n| !skip.contains(n)) {
            Mock::given(method("GET"))
                .and(path(format!("/templates/{name}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(fixture(name)))
                .mount(server)
                .await;
        }
    }

    fn composer_for(server: &MockServer) -> Composer {
        let mut config = AppConfig::default();
        config.source.base_url = Some(format!("{}/templates/", server.uri()));
        Composer::from_config(
            &config,
            DeploymentContext::new("acct.github.io", "/repo/index.html"),
        )
        .expect("build composer")
    }

    fn selection(languages: Vec<Language>, features: Vec<Feature>) -> Selection {
        Selection {
            project_name: "Inventory".into(),
            project_description: "Tracks stock levels".into(),
            project_type: ProjectType::WebApplication,
            operating_system: OperatingSystem::Linux,
            languages,
            features,
        }
    }

    async fn compose(composer: &Composer, selection: &Selection) -> ComposedDocument {
        match composer.generate(selection, &SilentProgress).await {
            GenerateOutcome::Document(doc) => doc,
            GenerateOutcome::Failed { message } => panic!("generation failed: {message}"),
        }
    }

    #[tokio::test]
    async fn blocks_follow_selection_order_not_completion_order() {
        let server = MockServer::start().await;
        // Python answers last.
        Mock::given(method("GET"))
            .and(path("/templates/languages/python-addon.md"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(fixture("languages/python-addon.md"))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        serve_fixtures(&server, &["languages/python-addon.md"]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(vec![Language::Python, Language::Java], vec![Feature::CodeQuality]),
        )
        .await;

        assert_eq!(
            doc.kinds(),
            vec![
                BlockKind::Header,
                BlockKind::Environment,
                BlockKind::CoreGuidelines,
                BlockKind::Feature(Feature::CodeQuality),
                BlockKind::Language(Language::Python),
                BlockKind::Language(Language::Java),
            ]
        );

        let text = doc.text();
        let python = text.find("## Python").expect("python addon");
        let java = text.find("## Java").expect("java addon");
        assert!(python < java);
        assert!(text.starts_with("# AI Coding Assistant Instructions"));
        assert!(text.contains("\n\n### コード品質ルール\n"));
    }

    #[tokio::test]
    async fn core_guidelines_are_the_extracted_section() {
        let server = MockServer::start().await;
        serve_fixtures(&server, &[]).await;

        let composer = composer_for(&server);
        let doc = compose(&composer, &selection(vec![Language::Go], vec![])).await;

        let core = &doc.blocks[2];
        assert_eq!(core.kind, BlockKind::CoreGuidelines);
        assert!(core.text.starts_with("## 汎用ガイドライン（全プロジェクト共通）"));
        assert!(!core.text.contains("## ドメイン駆動設計の基本原則"));
        assert!(!core.text.contains("# 共通ガイドライン\n"));
    }

    #[tokio::test]
    async fn style_sheet_feature_needs_a_script_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates/languages/scss-addon.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("languages/scss-addon.md")))
            .expect(0)
            .mount(&server)
            .await;
        serve_fixtures(&server, &["languages/scss-addon.md"]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(vec![Language::Python], vec![Feature::ScssSupport]),
        )
        .await;

        assert!(!doc.kinds().contains(&BlockKind::Feature(Feature::ScssSupport)));
        assert!(!doc.text().contains("## SCSS"));
    }

    #[tokio::test]
    async fn style_sheet_feature_with_typescript() {
        let server = MockServer::start().await;
        serve_fixtures(&server, &[]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(vec![Language::TypeScript], vec![Feature::ScssSupport]),
        )
        .await;

        assert!(doc.kinds().contains(&BlockKind::Feature(Feature::ScssSupport)));
        assert!(doc.text().contains("## SCSS"));
    }

    #[tokio::test]
    async fn missing_fragment_becomes_diagnostic_block() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates/languages/java-addon.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        serve_fixtures(&server, &["languages/java-addon.md"]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(vec![Language::Python, Language::Java], vec![]),
        )
        .await;

        let java = doc
            .blocks
            .iter()
            .find(|b| b.kind == BlockKind::Language(Language::Java))
            .expect("java block");
        let failed_url = format!("{}/templates/languages/java-addon.md", server.uri());
        assert!(java.text.starts_with("<!-- Template loading error: "));
        assert!(java.text.contains(&failed_url));
        assert!(doc.text().contains("## Python"));
    }

    #[tokio::test]
    async fn unreachable_guidelines_leave_diagnostic_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates/core/common-guidelines.md"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        serve_fixtures(&server, &["core/common-guidelines.md"]).await;

        let composer = composer_for(&server);
        let doc = compose(&composer, &selection(vec![Language::Rust], vec![])).await;

        // The diagnostic has no `##` heading, so no section can be extracted.
        assert_eq!(
            doc.kinds(),
            vec![
                BlockKind::Header,
                BlockKind::Environment,
                BlockKind::Language(Language::Rust),
            ]
        );
    }

    #[tokio::test]
    async fn guideline_features_share_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates/core/common-guidelines.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("core/common-guidelines.md")),
            )
            .expect(1)
            .mount(&server)
            .await;
        serve_fixtures(&server, &["core/common-guidelines.md"]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(
                vec![Language::Python],
                vec![Feature::DocumentationRules, Feature::DomainDrivenDesign],
            ),
        )
        .await;

        let features: Vec<&Block> = doc
            .blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Feature(_)))
            .collect();
        assert_eq!(features.len(), 2);
        assert!(features[0].text.starts_with("## ドキュメント作成ルール"));
        assert!(features[1].text.starts_with("## ドメイン駆動設計の基本原則"));
        assert_eq!(composer.loader().cache().hits(), 2);
    }

    #[tokio::test]
    async fn unhandled_features_are_skipped() {
        let server = MockServer::start().await;
        serve_fixtures(&server, &[]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(
                vec![Language::Java],
                vec![Feature::TestDrivenDevelopment, Feature::Unknown],
            ),
        )
        .await;

        assert!(
            !doc.kinds()
                .iter()
                .any(|k| matches!(k, BlockKind::Feature(_)))
        );
    }

    #[tokio::test]
    async fn shared_addon_is_fetched_once_and_repeated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates/languages/javascript-typescript-addon.md"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(fixture("languages/javascript-typescript-addon.md")),
            )
            .expect(1)
            .mount(&server)
            .await;
        serve_fixtures(&server, &["languages/javascript-typescript-addon.md"]).await;

        let composer = composer_for(&server);
        let doc = compose(
            &composer,
            &selection(vec![Language::JavaScript, Language::TypeScript], vec![]),
        )
        .await;

        assert_eq!(doc.blocks[3].text, doc.blocks[4].text);
        assert_eq!(doc.blocks[3].kind, BlockKind::Language(Language::JavaScript));
        assert_eq!(doc.blocks[4].kind, BlockKind::Language(Language::TypeScript));
    }

    #[tokio::test]
    async fn malformed_selection_yields_generic_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("## x"))
            .expect(0)
            .mount(&server)
            .await;

        let composer = composer_for(&server);
        let outcome = composer
            .generate(&selection(vec![], vec![]), &SilentProgress)
            .await;

        assert_eq!(
            outcome,
            GenerateOutcome::Failed {
                message: GENERATION_FAILED_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn text_joins_blocks_with_blank_line() {
        let server = MockServer::start().await;
        serve_fixtures(&server, &[]).await;

        let composer = composer_for(&server);
        let doc = compose(&composer, &selection(vec![Language::HtmlCss], vec![])).await;

        let expected = doc
            .blocks
            .iter()
            .map(|b| b.text.clone())
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(doc.text(), expected);
        assert_eq!(doc.to_string(), expected);
    }

    #[tokio::test]
    async fn language_addons_are_fetched_concurrently() {
        const DELAY: Duration = Duration::from_millis(400);
        let delayed = [
            "languages/java-addon.md",
            "languages/generic-addon.md",
            "languages/python-addon.md",
        ];

        let server = MockServer::start().await;
        for name in delayed {
            Mock::given(method("GET"))
                .and(path(format!("/templates/{name}")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(fixture(name))
                        .set_delay(DELAY),
                )
                .expect(1)
                .mount(&server)
                .await;
        }
        serve_fixtures(&server, &delayed).await;

        let composer = composer_for(&server);
        let started = std::time::Instant::now();
        let doc = compose(
            &composer,
            &selection(vec![Language::Java, Language::Go, Language::Python], vec![]),
        )
        .await;
        let elapsed = started.elapsed();

        // One after another would take at least three delays.
        assert!(elapsed < DELAY * 2, "addons took {elapsed:?}");
        assert_eq!(
            doc.kinds(),
            vec![
                BlockKind::Header,
                BlockKind::Environment,
                BlockKind::CoreGuidelines,
                BlockKind::Language(Language::Java),
                BlockKind::Language(Language::Go),
                BlockKind::Language(Language::Python),
            ]
        );
    }

    #[tokio::test]
    async fn feature_fragments_follow_configured_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates/shared/guidelines-v2.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("core/common-guidelines.md")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/templates/styles/scss.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(fixture("languages/scss-addon.md")),
            )
            .expect(1)
            .mount(&server)
            .await;
        serve_fixtures(&server, &["core/common-guidelines.md", "languages/scss-addon.md"]).await;

        let mut config = AppConfig::default();
        config.source.base_url = Some(format!("{}/templates/", server.uri()));
        config.fragments.common_guidelines = "/shared/guidelines-v2.md".into();
        config.fragments.scss = "/styles/scss.md".into();
        let composer = Composer::from_config(
            &config,
            DeploymentContext::new("acct.github.io", "/repo/index.html"),
        )
        .expect("build composer");

        let doc = compose(
            &composer,
            &selection(
                vec![Language::JavaScript],
                vec![Feature::DomainDrivenDesign, Feature::ScssSupport],
            ),
        )
        .await;

        let features: Vec<&Block> = doc
            .blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Feature(_)))
            .collect();
        assert_eq!(features.len(), 2);
        assert!(features[0].text.starts_with("## ドメイン駆動設計の基本原則"));
        assert!(features[1].text.starts_with("## SCSS"));
    }
}
