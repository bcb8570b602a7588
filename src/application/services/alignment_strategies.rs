use crate::domain::{HighlightPosition, ScriptSegment, TranscriptWord, confidence};

use super::text_normalizer::{TranscriptToken, normalize_words, tokenize_transcript};

/// Diagnostic lines produced while aligning. Returned to the caller and
/// mirrored to the tracing subscriber.
#[derive(Debug, Default, Clone)]
pub struct AlignmentLog {
    lines: Vec<String>,
}

impl AlignmentLog {
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "reelcut::alignment", "{}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepWindow {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl KeepWindow {
    pub fn is_empty(&self) -> bool {
        self.end_ms <= self.start_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Matched(KeepWindow),
    NoMatch,
    /// The highlight was located but no speech remains to keep.
    Fatal(String),
}

/// Inclusive range of transcript word indices covered by a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub first: usize,
    pub last: usize,
}

/// Everything a strategy needs, normalized once per alignment.
pub struct AlignmentContext<'a> {
    pub position: HighlightPosition,
    pub white_words: Vec<String>,
    pub highlight_words: Vec<String>,
    pub words: &'a [TranscriptWord],
    pub tokens: Vec<TranscriptToken>,
    pub margin_ms: u64,
}

impl<'a> AlignmentContext<'a> {
    pub fn new(script: &ScriptSegment, words: &'a [TranscriptWord], margin_ms: u64) -> Self {
        Self {
            position: script.highlight_position(),
            white_words: normalize_words(script.white_text()),
            highlight_words: normalize_words(script.highlight_text()),
            words,
            tokens: tokenize_transcript(words),
            margin_ms,
        }
    }

    /// First (or last, when `from_end`) contiguous run of `needle` in the transcript.
    pub fn find_sequence(&self, needle: &[String], from_end: bool) -> Option<WordSpan> {
        if needle.is_empty() || needle.len() > self.tokens.len() {
            return None;
        }

        let matches_at = |i: usize| {
            self.tokens[i..i + needle.len()]
                .iter()
                .zip(needle)
                .all(|(token, wanted)| &token.text == wanted)
        };
        let span_at = |i: usize| WordSpan {
            first: self.tokens[i].word_index,
            last: self.tokens[i + needle.len() - 1].word_index,
        };

        let last_start = self.tokens.len() - needle.len();
        if from_end {
            (0..=last_start).rev().find(|&i| matches_at(i)).map(span_at)
        } else {
            (0..=last_start).find(|&i| matches_at(i)).map(span_at)
        }
    }

    pub fn transcript_text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn last_word(&self) -> &TranscriptWord {
        &self.words[self.words.len() - 1]
    }

    /// Start anchored at the first spoken word.
    pub fn transcript_start(&self) -> u64 {
        self.words[0].start_ms.saturating_sub(self.margin_ms)
    }

    /// End anchored at the last spoken word.
    pub fn transcript_end(&self) -> u64 {
        self.last_word().end_ms + self.margin_ms
    }

    /// Keep from word `i` on, never reaching back into the previous word.
    pub fn keep_from(&self, i: usize) -> u64 {
        let start = self.words[i].start_ms.saturating_sub(self.margin_ms);
        match i.checked_sub(1).map(|p| &self.words[p]) {
            Some(prev) => start.max(prev.end_ms.min(self.words[i].start_ms)),
            None => start,
        }
    }

    /// Keep through word `i`, stopping strictly before the next word begins.
    pub fn keep_through(&self, i: usize) -> u64 {
        let word = &self.words[i];
        let end = (word.end_ms + self.margin_ms).max(word.start_ms + 1);
        match self.words.get(i + 1) {
            Some(next) => end.min(next.start_ms.saturating_sub(1)),
            None => end,
        }
    }

    /// Cut just before word `i`, where the trimmed-away span begins.
    pub fn cut_before(&self, i: usize) -> u64 {
        self.words[i].start_ms.saturating_sub(self.margin_ms)
    }

    /// Resume just after word `i`, where the trimmed-away span ends.
    pub fn resume_after(&self, i: usize) -> u64 {
        self.words[i].end_ms + self.margin_ms
    }

    fn words_of(&self, span: WordSpan) -> String {
        self.words[span.first..=span.last]
            .iter()
            .map(|w| w.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub trait AlignmentStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn confidence(&self) -> f32;

    fn try_align(&self, ctx: &AlignmentContext<'_>, log: &mut AlignmentLog) -> StrategyOutcome;

    fn is_fallback(&self) -> bool {
        false
    }
}

/// The whole white text appears verbatim.
pub struct ExactWhiteText;

impl AlignmentStrategy for ExactWhiteText {
    fn name(&self) -> &'static str {
        "exact_white_text"
    }

    fn confidence(&self) -> f32 {
        confidence::EXACT_WHITE_TEXT
    }

    fn try_align(&self, ctx: &AlignmentContext<'_>, log: &mut AlignmentLog) -> StrategyOutcome {
        match ctx.find_sequence(&ctx.white_words, false) {
            Some(span) => {
                let window = KeepWindow {
                    start_ms: ctx.keep_from(span.first),
                    end_ms: ctx.keep_through(span.last),
                };
                log.push(format!(
                    "[{}] found white text at words {}-{} (\"{}\") -> keep {}..{}ms",
                    self.name(),
                    span.first,
                    span.last,
                    ctx.words_of(span),
                    window.start_ms,
                    window.end_ms
                ));
                StrategyOutcome::Matched(window)
            }
            None => {
                log.push(format!("[{}] white text not found", self.name()));
                StrategyOutcome::NoMatch
            }
        }
    }
}

/// The white words next to the cut, three then two of them.
pub struct WhiteBoundary;

impl AlignmentStrategy for WhiteBoundary {
    fn name(&self) -> &'static str {
        "white_boundary"
    }

    fn confidence(&self) -> f32 {
        confidence::WHITE_BOUNDARY
    }

    fn try_align(&self, ctx: &AlignmentContext<'_>, log: &mut AlignmentLog) -> StrategyOutcome {
        if ctx.position == HighlightPosition::None {
            log.push(format!("[{}] skipped: no highlight", self.name()));
            return StrategyOutcome::NoMatch;
        }

        for n in [3usize, 2] {
            if ctx.white_words.len() < n {
                continue;
            }
            let white = &ctx.white_words;
            let (needle, edge) = match ctx.position {
                HighlightPosition::End => (&white[white.len() - n..], "last"),
                _ => (&white[..n], "first"),
            };

            let Some(span) = ctx.find_sequence(needle, false) else {
                log.push(format!(
                    "[{}] {} {} white words \"{}\" not found",
                    self.name(),
                    edge,
                    n,
                    needle.join(" ")
                ));
                continue;
            };

            let window = match ctx.position {
                HighlightPosition::End => KeepWindow {
                    start_ms: ctx.transcript_start(),
                    end_ms: ctx.keep_through(span.last),
                },
                _ => KeepWindow {
                    start_ms: ctx.keep_from(span.first),
                    end_ms: ctx.transcript_end(),
                },
            };
            log.push(format!(
                "[{}] found {} {} white words at words {}-{} -> keep {}..{}ms",
                self.name(),
                edge,
                n,
                span.first,
                span.last,
                window.start_ms,
                window.end_ms
            ));
            return StrategyOutcome::Matched(window);
        }

        StrategyOutcome::NoMatch
    }
}

/// The highlighted words next to the cut, three then two of them.
pub struct HighlightBoundary;

impl AlignmentStrategy for HighlightBoundary {
    fn name(&self) -> &'static str {
        "highlight_boundary"
    }

    fn confidence(&self) -> f32 {
        confidence::HIGHLIGHT_BOUNDARY
    }

    fn try_align(&self, ctx: &AlignmentContext<'_>, log: &mut AlignmentLog) -> StrategyOutcome {
        if ctx.position == HighlightPosition::None {
            log.push(format!("[{}] skipped: no highlight", self.name()));
            return StrategyOutcome::NoMatch;
        }

        for n in [3usize, 2] {
            if ctx.highlight_words.len() < n {
                continue;
            }
            let highlight = &ctx.highlight_words;
            let (needle, edge) = match ctx.position {
                HighlightPosition::End => (&highlight[..n], "first"),
                _ => (&highlight[highlight.len() - n..], "last"),
            };

            let Some(span) = ctx.find_sequence(needle, false) else {
                log.push(format!(
                    "[{}] {} {} highlighted words \"{}\" not found",
                    self.name(),
                    edge,
                    n,
                    needle.join(" ")
                ));
                continue;
            };

            let window = match ctx.position {
                HighlightPosition::End => KeepWindow {
                    start_ms: ctx.transcript_start(),
                    end_ms: ctx.cut_before(span.first),
                },
                _ => KeepWindow {
                    start_ms: ctx.resume_after(span.last),
                    end_ms: ctx.transcript_end(),
                },
            };

            if window.is_empty() {
                log.push(format!(
                    "[{}] highlighted words at words {}-{} leave no white text",
                    self.name(),
                    span.first,
                    span.last
                ));
                return StrategyOutcome::Fatal(format!(
                    "no white text {} the highlighted text",
                    if ctx.position == HighlightPosition::End {
                        "before"
                    } else {
                        "after"
                    }
                ));
            }

            log.push(format!(
                "[{}] found {} {} highlighted words at words {}-{} -> keep {}..{}ms",
                self.name(),
                edge,
                n,
                span.first,
                span.last,
                window.start_ms,
                window.end_ms
            ));
            return StrategyOutcome::Matched(window);
        }

        StrategyOutcome::NoMatch
    }
}

/// The entire highlighted text, placed by where in the transcript it lands.
pub struct WholeHighlight;

impl WholeHighlight {
    fn in_first_fifth(span: WordSpan, total: usize) -> bool {
        span.first * 5 < total
    }

    fn in_last_fifth(span: WordSpan, total: usize) -> bool {
        span.last * 5 > total * 4
    }
}

impl AlignmentStrategy for WholeHighlight {
    fn name(&self) -> &'static str {
        "whole_highlight"
    }

    fn confidence(&self) -> f32 {
        confidence::WHOLE_HIGHLIGHT
    }

    fn try_align(&self, ctx: &AlignmentContext<'_>, log: &mut AlignmentLog) -> StrategyOutcome {
        let from_end = ctx.position == HighlightPosition::End;
        let Some(span) = ctx.find_sequence(&ctx.highlight_words, from_end) else {
            log.push(format!("[{}] highlighted text not found", self.name()));
            return StrategyOutcome::NoMatch;
        };

        let total = ctx.words.len();
        let (window, placement) = if Self::in_last_fifth(span, total) {
            (
                KeepWindow {
                    start_ms: ctx.transcript_start(),
                    end_ms: ctx.cut_before(span.first),
                },
                "end",
            )
        } else if Self::in_first_fifth(span, total) {
            (
                KeepWindow {
                    start_ms: ctx.resume_after(span.last),
                    end_ms: ctx.transcript_end(),
                },
                "start",
            )
        } else {
            log.push(format!(
                "[{}] highlighted text at words {}-{} is mid-transcript, ignored",
                self.name(),
                span.first,
                span.last
            ));
            return StrategyOutcome::NoMatch;
        };

        if window.is_empty() {
            log.push(format!(
                "[{}] highlighted text at words {}-{} leaves no white text",
                self.name(),
                span.first,
                span.last
            ));
            return StrategyOutcome::Fatal(format!(
                "no white text around the highlighted text at the {} of the transcript",
                placement
            ));
        }

        log.push(format!(
            "[{}] found highlighted text at the {} (words {}-{}) -> keep {}..{}ms",
            self.name(),
            placement,
            span.first,
            span.last,
            window.start_ms,
            window.end_ms
        ));
        StrategyOutcome::Matched(window)
    }
}

/// Keeps the whole clip.
pub struct KeepEverything;

impl AlignmentStrategy for KeepEverything {
    fn name(&self) -> &'static str {
        "keep_everything"
    }

    fn confidence(&self) -> f32 {
        confidence::FALLBACK
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn try_align(&self, ctx: &AlignmentContext<'_>, log: &mut AlignmentLog) -> StrategyOutcome {
        let window = KeepWindow {
            start_ms: 0,
            end_ms: ctx.transcript_end(),
        };
        log.push(format!(
            "[{}] no match in transcript, keeping 0..{}ms",
            self.name(),
            window.end_ms
        ));
        StrategyOutcome::Matched(window)
    }
}

pub fn default_strategies() -> Vec<Box<dyn AlignmentStrategy>> {
    vec![
        Box::new(ExactWhiteText),
        Box::new(WhiteBoundary),
        Box::new(HighlightBoundary),
        Box::new(WholeHighlight),
        Box::new(KeepEverything),
    ]
}
