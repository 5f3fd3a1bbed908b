//! Feature → handler mapping.

use instructgen_shared::{Feature, FragmentPaths, SectionNames};

/// How the block for a selected feature is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureHandler {
    /// A named section of the common guidelines fragment.
    GuidelineSection(GuidelineSection),
    /// The locally generated code-quality rules.
    CodeQualityRules,
    /// The style-sheet addon fragment. Only applies alongside JavaScript or
    /// TypeScript.
    StyleSheetAddon,
}

/// Sections of the common guidelines that back a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidelineSection {
    DomainDrivenDesign,
    DocumentationRules,
}

impl GuidelineSection {
    pub fn heading<'a>(&self, sections: &'a SectionNames) -> &'a str {
        match self {
            Self::DomainDrivenDesign => &sections.domain_driven_design,
            Self::DocumentationRules => &sections.documentation_rules,
        }
    }
}

impl FeatureHandler {
    /// Handler for `feature`, or `None` when the feature contributes nothing.
    pub fn for_feature(feature: Feature) -> Option<Self> {
        match feature {
            Feature::DomainDrivenDesign => {
                Some(Self::GuidelineSection(GuidelineSection::DomainDrivenDesign))
            }
            Feature::DocumentationRules => {
                Some(Self::GuidelineSection(GuidelineSection::DocumentationRules))
            }
            Feature::CodeQuality => Some(Self::CodeQualityRules),
            Feature::ScssSupport => Some(Self::StyleSheetAddon),
            // The fragment store has no test-driven development section.
            Feature::TestDrivenDevelopment | Feature::Unknown => None,
        }
    }

    pub fn requires_script_language(&self) -> bool {
        matches!(self, Self::StyleSheetAddon)
    }

    /// Fragment this handler reads, if any.
    pub fn fragment<'a>(&self, paths: &'a FragmentPaths) -> Option<&'a str> {
        match self {
            Self::GuidelineSection(_) => Some(&paths.common_guidelines),
            Self::StyleSheetAddon => Some(&paths.scss),
            Self::CodeQualityRules => None,
        }
    }
}
