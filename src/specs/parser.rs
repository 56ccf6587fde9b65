//! Story Grammar
//!
//! The authored story shape is `GIVEN ... WHEN ... THEN ...`, matched
//! case-insensitively with each section non-empty. The grammar lives here
//! as one explicit parser so every consumer agrees on what counts as a
//! well-formed story.

use regex::Regex;
use tracing::warn;

use super::{BehavioralScenario, ScenarioTag};

/// Parser for authored `GIVEN ... WHEN ... THEN ...` strings
pub struct StoryParser {
    pattern: Regex,
}

impl Default for StoryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryParser {
    pub fn new() -> Self {
        Self {
            // (?is): case-insensitive, dot matches newlines in long stories
            pattern: Regex::new(r"(?is)^\s*GIVEN\s+(.+?)\s+WHEN\s+(.+?)\s+THEN\s+(.+?)\s*$")
                .expect("story pattern is valid"),
        }
    }

    /// Parse one authored story. Strings that do not match the
    /// three-keyword shape are dropped with a warning, never an error.
    ///
    /// Authored stories always parse to the `spec` tag; regression and
    /// critical classifications come from the mechanical generator only.
    pub fn parse(&self, story: &str) -> Option<BehavioralScenario> {
        let captures = match self.pattern.captures(story) {
            Some(c) => c,
            None => {
                warn!(story, "dropping story that does not match GIVEN/WHEN/THEN");
                return None;
            }
        };

        Some(BehavioralScenario {
            given: captures[1].trim().to_string(),
            when: captures[2].trim().to_string(),
            then: captures[3].trim().to_string(),
            tag: ScenarioTag::Spec,
        })
    }

    /// Parse a list of stories, dropping malformed entries
    pub fn parse_all(&self, stories: &[String]) -> Vec<BehavioralScenario> {
        stories.iter().filter_map(|s| self.parse(s)).collect()
    }
}
