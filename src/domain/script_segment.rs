use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the highlight span sits inside the script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HighlightPosition {
    Start,
    End,
    None,
}

impl HighlightPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightPosition::Start => "START",
            HighlightPosition::End => "END",
            HighlightPosition::None => "NONE",
        }
    }
}

impl FromStr for HighlightPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "START" => Ok(HighlightPosition::Start),
            "END" => Ok(HighlightPosition::End),
            "NONE" | "" => Ok(HighlightPosition::None),
            other => Err(format!("Invalid highlight position: {}", other)),
        }
    }
}

impl fmt::Display for HighlightPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A script line plus the span of it that gets spoken but trimmed away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptSegment {
    full_text: String,
    highlight_text: String,
    highlight_position: HighlightPosition,
}

impl ScriptSegment {
    pub fn new(
        full_text: impl Into<String>,
        highlight_text: impl Into<String>,
        highlight_position: HighlightPosition,
    ) -> Result<Self, ScriptSegmentError> {
        let full_text = full_text.into();
        let highlight_text = highlight_text.into();
        let full = full_text.trim();
        let highlight = highlight_text.trim();

        match highlight_position {
            HighlightPosition::None if !highlight.is_empty() => {
                return Err(ScriptSegmentError::UnexpectedHighlight);
            }
            HighlightPosition::Start | HighlightPosition::End if highlight.is_empty() => {
                return Err(ScriptSegmentError::MissingHighlight(highlight_position));
            }
            HighlightPosition::Start if !full.starts_with(highlight) => {
                return Err(ScriptSegmentError::HighlightNotAtEdge(highlight_position));
            }
            HighlightPosition::End if !full.ends_with(highlight) => {
                return Err(ScriptSegmentError::HighlightNotAtEdge(highlight_position));
            }
            _ => {}
        }

        Ok(Self {
            full_text,
            highlight_text,
            highlight_position,
        })
    }

    /// A segment with nothing to trim.
    pub fn plain(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            highlight_text: String::new(),
            highlight_position: HighlightPosition::None,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn highlight_text(&self) -> &str {
        &self.highlight_text
    }

    pub fn highlight_position(&self) -> HighlightPosition {
        self.highlight_position
    }

    /// The part of the line that survives the trim.
    pub fn white_text(&self) -> &str {
        let full = self.full_text.trim();
        let highlight = self.highlight_text.trim();
        match self.highlight_position {
            HighlightPosition::None => full,
            HighlightPosition::Start => full[highlight.len()..].trim(),
            HighlightPosition::End => full[..full.len() - highlight.len()].trim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptSegmentError {
    #[error("highlight text given but position is NONE")]
    UnexpectedHighlight,
    #[error("highlight position {0} requires highlight text")]
    MissingHighlight(HighlightPosition),
    #[error("highlight text is not found at the {0} of the script")]
    HighlightNotAtEdge(HighlightPosition),
}
