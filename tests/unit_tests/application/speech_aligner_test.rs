use reelcut::application::services::{AlignmentError, AlignmentStatus, SpeechAligner};
use reelcut::domain::{HighlightPosition, ScriptSegment, TranscriptWord, TrimEdge, confidence};

/// Contiguous words of `step_ms` each, starting at zero.
fn evenly_spaced(text: &str, step_ms: u64) -> Vec<TranscriptWord> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| TranscriptWord::new(w, i as u64 * step_ms, (i as u64 + 1) * step_ms))
        .collect()
}

fn assert_within_transcript(start: u64, end: u64, words: &[TranscriptWord], margin: u64) {
    let last_end = words.last().unwrap().end_ms;
    assert!(start < end, "empty window {}..{}", start, end);
    assert!(end <= last_end + margin, "end {} past {}", end, last_end + margin);
}

#[test]
fn given_highlight_at_end_and_exact_transcript_when_aligning_then_keeps_speech_before_highlight() {
    let script = ScriptSegment::new(
        "Astazi vreau sa va povestesc ceva interesant",
        "ceva interesant",
        HighlightPosition::End,
    )
    .unwrap();
    let words = evenly_spaced("Astazi vreau sa va povestesc ceva interesant", 400);

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    let cut = alignment.cut_points;
    assert_eq!(alignment.status, AlignmentStatus::Success);
    assert_eq!(cut.trim_edge, TrimEdge::End);
    assert!(cut.end_keep_ms < 2000, "end must stay before \"ceva\"");
    assert!(cut.start_keep_ms <= 50);
    assert!(cut.confidence >= 0.75);
    assert_eq!(cut.start_keep_ms, 0);
    assert_eq!(cut.end_keep_ms, 1999);
    assert_eq!(cut.confidence, confidence::EXACT_WHITE_TEXT);
    assert_within_transcript(cut.start_keep_ms, cut.end_keep_ms, &words, 50);
}

#[test]
fn given_highlight_at_start_when_aligning_then_start_never_reaches_into_previous_word() {
    let script = ScriptSegment::new(
        "Stai putin. Asta schimba tot",
        "Stai putin.",
        HighlightPosition::Start,
    )
    .unwrap();
    let words = vec![
        TranscriptWord::new("Stai", 0, 300),
        TranscriptWord::new("putin.", 300, 700),
        TranscriptWord::new("Asta", 900, 1200),
        TranscriptWord::new("schimba", 1200, 1600),
        TranscriptWord::new("tot.", 1600, 2000),
    ];

    let alignment = SpeechAligner::new(50)
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.cut_points.trim_edge, TrimEdge::Start);
    assert_eq!(alignment.cut_points.start_keep_ms, 850);
    assert_eq!(alignment.cut_points.end_keep_ms, 2050);
    assert_eq!(alignment.strategy, "exact_white_text");
}

#[test]
fn given_misheard_first_word_when_aligning_then_white_boundary_words_place_the_end() {
    let script = ScriptSegment::new(
        "Astazi vreau sa va povestesc ceva interesant",
        "ceva interesant",
        HighlightPosition::End,
    )
    .unwrap();
    let words = evenly_spaced("Azi vreau sa va povestesc ceva interesant", 400);

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.strategy, "white_boundary");
    assert_eq!(alignment.cut_points.confidence, confidence::WHITE_BOUNDARY);
    assert_eq!(alignment.cut_points.start_keep_ms, 0);
    assert_eq!(alignment.cut_points.end_keep_ms, 1999);
}

#[test]
fn given_white_text_unrecognizable_when_aligning_then_highlight_boundary_cuts_before_highlight() {
    let script = ScriptSegment::new(
        "unu doi trei patru cinci sase sapte",
        "cinci sase sapte",
        HighlightPosition::End,
    )
    .unwrap();
    let words = evenly_spaced("unu doj trej patro cinci sase sapte", 400);

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.strategy, "highlight_boundary");
    assert_eq!(alignment.cut_points.confidence, confidence::HIGHLIGHT_BOUNDARY);
    assert_eq!(alignment.cut_points.start_keep_ms, 0);
    assert_eq!(alignment.cut_points.end_keep_ms, 1550);
}

#[test]
fn given_single_word_highlight_near_the_end_when_aligning_then_whole_highlight_match_is_used() {
    let script = ScriptSegment::new(
        "unu doi trei patru cinci bonus",
        "bonus",
        HighlightPosition::End,
    )
    .unwrap();
    let words = evenly_spaced("unx dox trex patrx cincx bonus", 400);

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.strategy, "whole_highlight");
    assert_eq!(alignment.cut_points.confidence, confidence::WHOLE_HIGHLIGHT);
    assert_eq!(alignment.cut_points.start_keep_ms, 0);
    assert_eq!(alignment.cut_points.end_keep_ms, 1950);
}

#[test]
fn given_highlight_found_mid_transcript_when_nothing_else_matches_then_falls_back_with_warning() {
    let script = ScriptSegment::new("aaa bbb bonus", "bonus", HighlightPosition::End).unwrap();
    let words = evenly_spaced("x1 x2 x3 x4 x5 bonus x7 x8 x9 x10", 300);

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.status, AlignmentStatus::Warning);
    assert!(alignment.cut_points.is_fallback());
    assert_eq!(alignment.cut_points.start_keep_ms, 0);
    assert_eq!(alignment.cut_points.end_keep_ms, 3050);
}

#[test]
fn given_transcript_sharing_no_words_when_aligning_then_keeps_whole_clip() {
    let script = ScriptSegment::plain("ceva complet diferit");
    let words = evenly_spaced("alpha beta gamma", 500);

    let alignment = SpeechAligner::new(80)
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.status, AlignmentStatus::Warning);
    assert_eq!(alignment.cut_points.confidence, confidence::FALLBACK);
    assert_eq!(alignment.cut_points.start_keep_ms, 0);
    assert_eq!(alignment.cut_points.end_keep_ms, 1580);
    assert!(alignment.log.iter().any(|l| l.contains("keep_everything")));
}

#[test]
fn given_highlight_covering_whole_script_when_aligning_then_no_white_text_error() {
    let script = ScriptSegment::new("ceva interesant", "ceva interesant", HighlightPosition::End)
        .unwrap();
    let words = evenly_spaced("ceva interesant", 400);

    let result = SpeechAligner::default().compute_cut_points(&script, &words);

    match result {
        Err(err @ AlignmentError::NoWhiteText { .. }) => assert!(!err.log().is_empty()),
        other => panic!("expected NoWhiteText, got {:?}", other),
    }
}

#[test]
fn given_highlight_at_transcript_start_for_end_position_when_aligning_then_no_white_text_error() {
    let script = ScriptSegment::new("unu doi trei patru", "trei patru", HighlightPosition::End)
        .unwrap();
    let words = evenly_spaced("trei patru xyz", 400);

    let result = SpeechAligner::default().compute_cut_points(&script, &words);

    assert!(matches!(result, Err(AlignmentError::NoWhiteText { .. })));
}

#[test]
fn given_empty_transcript_when_aligning_then_empty_transcript_error() {
    let script = ScriptSegment::plain("orice");

    let result = SpeechAligner::default().compute_cut_points(&script, &[]);

    assert!(matches!(result, Err(AlignmentError::EmptyTranscript)));
}

#[test]
fn given_diacritics_and_punctuation_in_transcript_when_aligning_then_still_matches_exactly() {
    let script = ScriptSegment::plain("Buna ziua, dragi prieteni");
    let words = vec![
        TranscriptWord::new("Bună", 100, 400),
        TranscriptWord::new("ziua,", 400, 700),
        TranscriptWord::new("dragi", 750, 1000),
        TranscriptWord::new("prieteni!", 1000, 1500),
    ];

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.cut_points.confidence, confidence::EXACT_WHITE_TEXT);
    assert_eq!(alignment.cut_points.start_keep_ms, 50);
    assert_eq!(alignment.cut_points.end_keep_ms, 1550);
}

#[test]
fn given_any_alignment_when_logged_then_every_stage_tried_is_recorded() {
    let script = ScriptSegment::new(
        "unu doi trei patru cinci sase sapte",
        "cinci sase sapte",
        HighlightPosition::End,
    )
    .unwrap();
    let words = evenly_spaced("unu doj trej patro cinci sase sapte", 400);

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    let log = alignment.log.join("\n");
    assert!(log.contains("[exact_white_text] white text not found"));
    assert!(log.contains("[white_boundary]"));
    assert!(log.contains("[highlight_boundary] found first 3"));
}

#[test]
fn given_one_millisecond_word_touching_the_highlight_when_aligning_then_end_stays_before_highlight() {
    let script = ScriptSegment::new("unu doi trei", "trei", HighlightPosition::End).unwrap();
    let words = vec![
        TranscriptWord::new("unu", 0, 400),
        TranscriptWord::new("doi", 400, 401),
        TranscriptWord::new("trei", 401, 800),
    ];

    let alignment = SpeechAligner::default()
        .compute_cut_points(&script, &words)
        .unwrap();

    assert_eq!(alignment.status, AlignmentStatus::Success);
    assert!(alignment.cut_points.end_keep_ms < 401);
    assert_eq!(alignment.cut_points.end_keep_ms, 400);
}
