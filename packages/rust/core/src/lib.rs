//! Document composition for instructgen.
//!
//! This crate ties together the fragment loader, section extraction, and the
//! locally generated parts into one instruction document per selection.

pub mod composer;
pub mod features;
pub mod languages;
pub mod parts;

pub use composer::{
    Block, BlockKind, ComposedDocument, Composer, GENERATION_FAILED_MESSAGE, GenerateOutcome,
    ProgressReporter, SilentProgress,
};
