//! Renderer tuning options, grouped by category.
//!
//! # Invariants
//! - Iteration order is stable: categories and parameters come out in
//!   name order, so the same profile always yields the same call
//!   sequence against the rendering interface.
//! - The profile carries values verbatim. Whether a value is acceptable
//!   for a given parameter is the renderer's contract, not ours.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single renderer tuning value.
///
/// `IntPair` is a fixed pair rather than a list because the interface
/// takes exactly two values for paired parameters such as bucket
/// dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    Int(i32),
    IntPair(i32, i32),
    Float(f32),
    Str(String),
}

/// A named collection of renderer tuning parameters.
///
/// Profiles are applied after a session opens and before the world phase
/// begins; the renderer ignores option changes once geometry starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOptionProfile {
    categories: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl RenderOptionProfile {
    /// An empty profile; applying it performs no option calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small-bucket tuning: gridsize 9, bucketsize 6x6.
    ///
    /// Smaller buckets lower peak memory at the cost of per-bucket
    /// overhead, and the gridsize has to shrink with them or memory use
    /// goes back up. Past a point the overhead dominates, so these values
    /// are about as low as is worth going.
    pub fn small_buckets() -> Self {
        let mut profile = Self::new();
        profile.set("limits", "gridsize", OptionValue::Int(9));
        profile.set("limits", "bucketsize", OptionValue::IntPair(6, 6));
        profile
    }

    /// Set one parameter, replacing any previous value under the same
    /// category and name.
    pub fn set(&mut self, category: &str, name: &str, value: OptionValue) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Look up one parameter.
    pub fn get(&self, category: &str, name: &str) -> Option<&OptionValue> {
        self.categories
            .get(category)
            .and_then(|params| params.get(name))
    }

    /// Iterate categories with their parameters, in name order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, OptionValue>)> {
        self.categories
            .iter()
            .map(|(name, params)| (name.as_str(), params))
    }

    /// Whether the profile carries any parameters.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
