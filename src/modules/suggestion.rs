use serde::{Deserialize, Serialize};

/// Suggestion identifies one actionable hint. The identifier is stable;
/// `message` gives a default English rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    // pose
    AdjustFacePosition,
    AlignShoulders,
    AdjustHips,
    AlignToThirds,
    CenterSubject,
    MatchOverallPose,
    // face
    AdjustFaceCenter,
    AdjustEyes,
    AdjustEars,
    AdjustMouthAndChin,
    AdjustForehead,
    CenterFaceInFrame,
    MatchOverallFace,

    SubjectNotDetected,
}

impl Suggestion {
    pub fn message(&self) -> &'static str {
        match self {
            Suggestion::AdjustFacePosition => "Move your face to match the reference framing",
            Suggestion::AlignShoulders => "Line up your shoulders with the reference",
            Suggestion::AdjustHips => "Adjust your waist position",
            Suggestion::AlignToThirds => "Move to sit on the rule-of-thirds lines",
            Suggestion::CenterSubject => "Shift so your body is balanced like the reference",
            Suggestion::MatchOverallPose => "Match your overall pose and framing to the reference",
            Suggestion::AdjustFaceCenter => "Move your face toward the reference center",
            Suggestion::AdjustEyes => "Adjust your eye position",
            Suggestion::AdjustEars => "Adjust your head angle so your ears line up",
            Suggestion::AdjustMouthAndChin => "Adjust your mouth and chin position",
            Suggestion::AdjustForehead => "Tilt your head to match the reference",
            Suggestion::CenterFaceInFrame => "Bring your face to the reference spot in the frame",
            Suggestion::MatchOverallFace => "Match your overall face position to the reference",
            Suggestion::SubjectNotDetected => "Step into the frame",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_identifier() {
        assert_eq!(serde_json::to_string(&Suggestion::AlignToThirds).unwrap(), r#""align_to_thirds""#);
        let s: Suggestion = serde_json::from_str(r#""adjust_mouth_and_chin""#).unwrap();
        assert_eq!(s, Suggestion::AdjustMouthAndChin);
        assert!(!s.message().is_empty());
    }
}
