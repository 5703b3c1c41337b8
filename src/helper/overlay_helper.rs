use serde::{Deserialize, Serialize};
use crate::modules::result::ComparisonResult;
use crate::modules::suggestion::Suggestion;

/// ScoreGrade buckets the overall score for display color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: f32) -> Self {
        if score >= 90.0 {
            ScoreGrade::Good
        } else if score >= 70.0 {
            ScoreGrade::Fair
        } else {
            ScoreGrade::Poor
        }
    }
}

/// Direction the subject should move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionCue {
    pub region: String,
    pub cue: Cue,
    /// Length of the offset the cue corrects, in normalized units.
    pub magnitude: f32,
}

/// OverlayGuidance is everything a renderer needs to draw one result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayGuidance {
    pub grade: ScoreGrade,
    pub score_label: String,
    /// Opacity for the cue arrows; stronger the further from the reference.
    pub cue_alpha: u8,
    pub cues: Vec<RegionCue>,
    pub suggestions: Vec<Suggestion>,
}

/// build_overlay turns a comparison result into display guidance.
///
/// A cue is produced for every region whose difference exceeds `threshold`,
/// pointing along the dominant axis of its offset. Image y grows downward,
/// so a positive vertical offset asks the subject to move up.
///
/// # Arguments
/// * `result` - ComparisonResult
/// * `threshold` - minimum region difference that earns a cue
///
/// # Returns
/// * `OverlayGuidance`
pub fn build_overlay(result: &ComparisonResult, threshold: f32) -> OverlayGuidance {
    let cues = result
        .offsets
        .iter()
        .filter(|(region, _)| result.difference(region).is_some_and(|d| d > threshold))
        .map(|(region, offset)| {
            let cue = if offset.dx.abs() >= offset.dy.abs() {
                if offset.dx > 0.0 { Cue::Left } else { Cue::Right }
            } else if offset.dy > 0.0 {
                Cue::Up
            } else {
                Cue::Down
            };
            RegionCue {
                region: region.clone(),
                cue,
                magnitude: offset.dx.hypot(offset.dy),
            }
        })
        .collect();

    OverlayGuidance {
        grade: ScoreGrade::from_score(result.overall_score),
        score_label: format!("{}%", result.overall_score as i32),
        cue_alpha: ((100.0 - result.overall_score) * 2.55).clamp(0.0, 255.0) as u8,
        cues,
        suggestions: result.suggestions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use super::*;
    use crate::utils::geometry::Offset;

    fn result(overall: f32, regions: &[(&str, f32, f32, f32)]) -> ComparisonResult {
        let mut detailed = BTreeMap::new();
        let mut offsets = BTreeMap::new();
        for (name, diff, dx, dy) in regions {
            detailed.insert(name.to_string(), *diff);
            offsets.insert(name.to_string(), Offset { dx: *dx, dy: *dy });
        }
        ComparisonResult {
            overall_score: overall,
            position_score: overall,
            composition_score: overall,
            suggestions: vec![],
            detailed_scores: detailed,
            offsets,
        }
    }

    #[test]
    fn test_grades_and_label() {
        assert_eq!(ScoreGrade::from_score(95.0), ScoreGrade::Good);
        assert_eq!(ScoreGrade::from_score(70.0), ScoreGrade::Fair);
        assert_eq!(ScoreGrade::from_score(69.9), ScoreGrade::Poor);

        let overlay = build_overlay(&result(87.6, &[]), 0.1);
        assert_eq!(overlay.score_label, "87%");
        assert_eq!(overlay.cue_alpha, 31);
        assert!(overlay.cues.is_empty());

        assert_eq!(build_overlay(&result(100.0, &[]), 0.1).cue_alpha, 0);
        assert_eq!(build_overlay(&result(0.0, &[]), 0.1).cue_alpha, 255);
    }

    #[test]
    fn test_cue_directions() {
        let r = result(
            40.0,
            &[
                ("HIPS", 0.3, 0.0, 0.3),
                ("NOSE", 0.2, -0.2, 0.0),
                ("SHOULDERS", 0.05, 0.05, 0.0),
            ],
        );
        let overlay = build_overlay(&r, 0.1);
        assert_eq!(overlay.cues.len(), 2);
        assert_eq!(overlay.cues[0].region, "HIPS");
        assert_eq!(overlay.cues[0].cue, Cue::Up);
        assert_eq!(overlay.cues[1].cue, Cue::Right);
        assert!((overlay.cues[1].magnitude - 0.2).abs() < 1e-6);
    }
}
