//! Property-based test generators using proptest.
//!
//! Provides strategies for status documents that hold exactly one row per
//! entity, which is the shape the updater's guarantees are stated for.

use proptest::prelude::*;
use std::collections::BTreeMap;
use streamstatus_core::StatusMarker;

/// Strategy for lowercase entity names.
pub fn entity_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for a set of uniquely named entities and their online state.
pub fn roster_strategy() -> impl Strategy<Value = BTreeMap<String, bool>> {
    prop::collection::btree_map(entity_name_strategy(), any::<bool>(), 1..8)
}

/// Renders a roster as a status document table.
pub fn render_document(roster: &BTreeMap<String, bool>) -> String {
    let mut text = String::from("Live | Name\n--- | ---\n");
    for (name, online) in roster {
        text.push_str(&StatusMarker::for_state(*online).row(name));
        text.push('\n');
    }
    text
}

/// Uppercases the first character of a name.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
