//! Behavioral Spec Extraction and Generation
//!
//! Turns authored `x-user-stories` strings and constraint metadata into
//! structured Given/When/Then scenarios, plus the canonical element
//! identifiers downstream UI tests hook onto. Authored strings are the
//! source of truth and are never rewritten; the pipeline only parses,
//! deduplicates, and supplements them.

pub mod extract;
pub mod generate;
pub mod parser;

use serde::{Deserialize, Serialize};

pub use extract::{collect_story_strings, element_identifiers, extract};
pub use generate::synthesize;
pub use parser::StoryParser;

/// Classification tag of a behavioral scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioTag {
    Spec,
    Regression,
    Critical,
}

/// One structured Given/When/Then triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralScenario {
    pub given: String,
    pub when: String,
    pub then: String,
    pub tag: ScenarioTag,
}

/// All scenarios and element identifiers for one property path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyScenarios {
    pub property_path: String,
    pub scenarios: Vec<BehavioralScenario>,
    /// Deduplicated canonical element identifiers, in generation order
    pub element_ids: Vec<String>,
}
