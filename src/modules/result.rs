use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::modules::suggestion::Suggestion;
use crate::utils::geometry::Offset;

/// DifferenceMap holds one difference value per measured region, keyed by
/// region name. Regions that could not be measured are absent.
pub type DifferenceMap = BTreeMap<String, f32>;

/// ComparisonResult is the outcome of comparing one frame against a reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    /// Blend of position and composition, within [0, 100].
    pub overall_score: f32,
    pub position_score: f32,
    pub composition_score: f32,
    /// Hints in priority order.
    pub suggestions: Vec<Suggestion>,
    pub detailed_scores: DifferenceMap,
    /// Signed displacement of each measured region from its reference point.
    pub offsets: BTreeMap<String, Offset>,
}

impl ComparisonResult {
    pub fn difference(&self, region: &str) -> Option<f32> {
        self.detailed_scores.get(region).copied()
    }

    pub fn has_suggestion(&self, suggestion: Suggestion) -> bool {
        self.suggestions.contains(&suggestion)
    }
}
