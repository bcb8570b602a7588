use serde::Serialize;

use crate::domain::TextOverlay;

use super::drawtext::drawtext_chain;
use super::filter_graph::FilterGraph;

/// Body of `POST /ffmpeg/process`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeTask {
    pub inputs: Vec<TaskInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_complex: Option<String>,
    pub outputs: Vec<TaskOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskInput {
    pub file_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutput {
    pub file: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub maps: Vec<String>,
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Milliseconds as the seconds string ffmpeg expects, e.g. `1.25`.
pub fn seconds_arg(ms: u64) -> String {
    let whole = ms / 1000;
    let frac = ms % 1000;
    if frac == 0 {
        whole.to_string()
    } else {
        format!("{}.{:03}", whole, frac)
            .trim_end_matches('0')
            .to_string()
    }
}

impl EncodeTask {
    /// Mono 48 kHz 16-bit WAV of the input's audio track.
    pub fn extract_audio(video_path: &str, output_file: &str) -> Self {
        Self {
            inputs: vec![TaskInput {
                file_path: video_path.to_string(),
                options: Vec::new(),
            }],
            filter_complex: None,
            outputs: vec![TaskOutput {
                file: output_file.to_string(),
                options: args(&["-vn", "-ac", "1", "-ar", "48000", "-sample_fmt", "s16"]),
                maps: Vec::new(),
            }],
        }
    }

    /// Cuts `[start_ms, end_ms)` out of the video. A replacement audio input is
    /// cut at the same offsets so both stay in sync.
    pub fn trim(
        video_path: &str,
        audio_path: Option<&str>,
        start_ms: u64,
        end_ms: u64,
        overlay: Option<&TextOverlay>,
        output_file: &str,
    ) -> Self {
        let window = vec![
            "-ss".to_string(),
            seconds_arg(start_ms),
            "-t".to_string(),
            seconds_arg(end_ms.saturating_sub(start_ms)),
        ];
        let overlay = overlay.filter(|o| o.is_visible());

        let mut inputs = vec![TaskInput {
            file_path: video_path.to_string(),
            options: window.clone(),
        }];
        let mut options = Vec::new();

        if let Some(audio_path) = audio_path {
            inputs.push(TaskInput {
                file_path: audio_path.to_string(),
                options: window,
            });
            options.extend(args(&["-map", "0:v:0", "-map", "1:a:0"]));
        }

        match overlay {
            Some(overlay) => {
                options.extend(args(&["-c:v", "libx264"]));
                options.extend(args(&["-c:a", "aac", "-b:a", "192k", "-ar", "48000"]));
                options.push("-vf".to_string());
                options.push(drawtext_chain(overlay).to_string());
            }
            None => options.extend(args(&["-c:v", "copy", "-c:a", "copy"])),
        }

        Self {
            inputs,
            filter_complex: None,
            outputs: vec![TaskOutput {
                file: output_file.to_string(),
                options,
                maps: Vec::new(),
            }],
        }
    }

    pub fn concat(paths: &[String], normalize_loudness: bool, output_file: &str) -> Self {
        let (graph, outputs) = FilterGraph::concat(paths.len(), normalize_loudness);
        Self {
            inputs: paths
                .iter()
                .map(|p| TaskInput {
                    file_path: p.clone(),
                    options: Vec::new(),
                })
                .collect(),
            filter_complex: Some(graph.to_string()),
            outputs: vec![TaskOutput {
                file: output_file.to_string(),
                options: args(&[
                    "-fflags", "+genpts", "-c:v", "libx264", "-crf", "18", "-preset", "medium",
                    "-c:a", "aac", "-ar", "48000", "-ac", "1", "-shortest",
                ]),
                maps: outputs.maps(),
            }],
        }
    }
}
