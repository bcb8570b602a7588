use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::domain::TranscriptWord;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Folds text to the form used for script/transcript matching: no diacritics,
/// no punctuation, lower case, single spaces.
pub fn normalize_text(raw: &str) -> String {
    let separated: String = raw
        .chars()
        .map(|c| match c {
            '-' | ',' | '.' | '"' | '\'' => ' ',
            other => other,
        })
        .collect();

    let stripped: String = separated.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let cleaned = NON_WORD.replace_all(&stripped, "");

    cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_words(raw: &str) -> Vec<String> {
    normalize_text(raw)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// A normalized token of the transcript and the word it came from. One word
/// can yield several tokens ("l-am") or none (a lone punctuation mark).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptToken {
    pub text: String,
    pub word_index: usize,
}

pub fn tokenize_transcript(words: &[TranscriptWord]) -> Vec<TranscriptToken> {
    words
        .iter()
        .enumerate()
        .flat_map(|(word_index, word)| {
            normalize_words(&word.text)
                .into_iter()
                .map(move |text| TranscriptToken { text, word_index })
        })
        .collect()
}
