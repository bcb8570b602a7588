use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequest {
    pub ordered_clip_urls: Vec<String>,
    #[serde(default = "default_normalize_loudness")]
    pub normalize_loudness: bool,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

impl MergeRequest {
    pub fn new(ordered_clip_urls: Vec<String>, normalize_loudness: bool) -> Self {
        Self {
            ordered_clip_urls,
            normalize_loudness,
            output_name: default_output_name(),
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }
}

fn default_normalize_loudness() -> bool {
    true
}

fn default_output_name() -> String {
    "merged".to_string()
}
