use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClipPhase {
    Queued,
    Extracting,
    Aligning,
    Assembling,
    Done,
    Failed,
}

impl ClipPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipPhase::Queued => "QUEUED",
            ClipPhase::Extracting => "EXTRACTING",
            ClipPhase::Aligning => "ALIGNING",
            ClipPhase::Assembling => "ASSEMBLING",
            ClipPhase::Done => "DONE",
            ClipPhase::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClipPhase::Done | ClipPhase::Failed)
    }

    /// The state that follows a successful step. Terminal states stay put.
    pub fn next(&self) -> ClipPhase {
        match self {
            ClipPhase::Queued => ClipPhase::Extracting,
            ClipPhase::Extracting => ClipPhase::Aligning,
            ClipPhase::Aligning => ClipPhase::Assembling,
            ClipPhase::Assembling => ClipPhase::Done,
            ClipPhase::Done => ClipPhase::Done,
            ClipPhase::Failed => ClipPhase::Failed,
        }
    }
}

impl FromStr for ClipPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(ClipPhase::Queued),
            "EXTRACTING" => Ok(ClipPhase::Extracting),
            "ALIGNING" => Ok(ClipPhase::Aligning),
            "ASSEMBLING" => Ok(ClipPhase::Assembling),
            "DONE" => Ok(ClipPhase::Done),
            "FAILED" => Ok(ClipPhase::Failed),
            _ => Err(format!("Invalid clip phase: {}", s)),
        }
    }
}

impl fmt::Display for ClipPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
