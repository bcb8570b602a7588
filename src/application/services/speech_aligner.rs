use serde::Serialize;

use crate::domain::{CutPoints, HighlightPosition, ScriptSegment, TrimEdge, TranscriptWord};

use super::alignment_strategies::{
    AlignmentContext, AlignmentLog, AlignmentStrategy, StrategyOutcome, default_strategies,
};

pub const DEFAULT_MARGIN_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentStatus {
    Success,
    /// Nothing matched and the whole clip is kept.
    Warning,
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub cut_points: CutPoints,
    pub log: Vec<String>,
    pub status: AlignmentStatus,
    pub strategy: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    #[error("no white text left to keep: {reason}")]
    NoWhiteText { reason: String, log: Vec<String> },
    #[error("transcript has no words to align against")]
    EmptyTranscript,
}

impl AlignmentError {
    pub fn log(&self) -> &[String] {
        match self {
            AlignmentError::NoWhiteText { log, .. } => log,
            AlignmentError::EmptyTranscript => &[],
        }
    }
}

/// Finds the millisecond window of a clip holding only the non-highlighted
/// speech. Runs an ordered list of strategies and takes the first match.
pub struct SpeechAligner {
    margin_ms: u64,
    strategies: Vec<Box<dyn AlignmentStrategy>>,
}

impl Default for SpeechAligner {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN_MS)
    }
}

impl SpeechAligner {
    pub fn new(margin_ms: u64) -> Self {
        Self {
            margin_ms,
            strategies: default_strategies(),
        }
    }

    pub fn margin_ms(&self) -> u64 {
        self.margin_ms
    }

    pub fn compute_cut_points(
        &self,
        script: &ScriptSegment,
        words: &[TranscriptWord],
    ) -> Result<Alignment, AlignmentError> {
        if words.is_empty() {
            return Err(AlignmentError::EmptyTranscript);
        }

        let ctx = AlignmentContext::new(script, words, self.margin_ms);
        let mut log = AlignmentLog::default();
        log.push(format!(
            "position={} white=\"{}\" highlight=\"{}\" transcript=\"{}\" ({} words)",
            script.highlight_position(),
            ctx.white_words.join(" "),
            ctx.highlight_words.join(" "),
            ctx.transcript_text(),
            words.len()
        ));

        if script.highlight_position() != HighlightPosition::None && ctx.white_words.is_empty() {
            log.push("highlighted text covers the whole script");
            return Err(AlignmentError::NoWhiteText {
                reason: "highlighted text covers the whole script".to_string(),
                log: log.into_lines(),
            });
        }

        let trim_edge = TrimEdge::from(script.highlight_position());

        for strategy in &self.strategies {
            match strategy.try_align(&ctx, &mut log) {
                StrategyOutcome::Matched(window) if window.is_empty() => {
                    log.push(format!(
                        "[{}] empty window {}..{}ms discarded",
                        strategy.name(),
                        window.start_ms,
                        window.end_ms
                    ));
                }
                StrategyOutcome::Matched(window) => {
                    let status = if strategy.is_fallback() {
                        AlignmentStatus::Warning
                    } else {
                        AlignmentStatus::Success
                    };
                    tracing::debug!(
                        strategy = strategy.name(),
                        start_ms = window.start_ms,
                        end_ms = window.end_ms,
                        "Alignment resolved"
                    );
                    return Ok(Alignment {
                        cut_points: CutPoints {
                            start_keep_ms: window.start_ms,
                            end_keep_ms: window.end_ms,
                            trim_edge,
                            confidence: strategy.confidence(),
                        },
                        log: log.into_lines(),
                        status,
                        strategy: strategy.name(),
                    });
                }
                StrategyOutcome::NoMatch => {}
                StrategyOutcome::Fatal(reason) => {
                    return Err(AlignmentError::NoWhiteText {
                        reason,
                        log: log.into_lines(),
                    });
                }
            }
        }

        // KeepEverything always matches unless the last word ends at 0ms.
        let end_keep_ms = ctx.transcript_end().max(1);
        log.push(format!("no strategy produced a window, keeping 0..{}ms", end_keep_ms));
        Ok(Alignment {
            cut_points: CutPoints {
                start_keep_ms: 0,
                end_keep_ms,
                trim_edge,
                confidence: crate::domain::confidence::FALLBACK,
            },
            log: log.into_lines(),
            status: AlignmentStatus::Warning,
            strategy: "keep_everything",
        })
    }
}
