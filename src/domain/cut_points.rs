use serde::Serialize;

use super::HighlightPosition;

/// Which edge of the clip the trimmed-away span was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrimEdge {
    Start,
    End,
}

impl From<HighlightPosition> for TrimEdge {
    fn from(position: HighlightPosition) -> Self {
        match position {
            HighlightPosition::End => TrimEdge::End,
            HighlightPosition::Start | HighlightPosition::None => TrimEdge::Start,
        }
    }
}

/// Discrete confidence levels, one per alignment strategy.
pub mod confidence {
    pub const EXACT_WHITE_TEXT: f32 = 0.95;
    pub const WHOLE_HIGHLIGHT: f32 = 0.90;
    pub const WHITE_BOUNDARY: f32 = 0.80;
    pub const HIGHLIGHT_BOUNDARY: f32 = 0.75;
    pub const FALLBACK: f32 = 0.50;
}

/// The millisecond window of a clip kept after trimming. `start_keep_ms < end_keep_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutPoints {
    pub start_keep_ms: u64,
    pub end_keep_ms: u64,
    pub trim_edge: TrimEdge,
    pub confidence: f32,
}

impl CutPoints {
    pub fn duration_ms(&self) -> u64 {
        self.end_keep_ms - self.start_keep_ms
    }

    pub fn is_fallback(&self) -> bool {
        self.confidence <= confidence::FALLBACK
    }
}
