use serde::{Deserialize, Serialize};

/// Caption burned into a clip while it is trimmed. Positions are percentages of
/// the frame, sizes are in pixels of the reference frame and scaled by `scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverlay {
    pub text: String,
    pub font_size: u32,
    pub font_family: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub text_color: String,
    pub background_color: String,
    pub opacity: f32,
    pub x_percent: f32,
    pub y_percent: f32,
    pub padding: u32,
    pub line_spacing: u32,
    pub scale: f32,
    pub video_width: u32,
    pub video_height: u32,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 48,
            font_family: None,
            bold: false,
            italic: false,
            text_color: "#FFFFFF".to_string(),
            background_color: "#000000".to_string(),
            opacity: 0.6,
            x_percent: 50.0,
            y_percent: 20.0,
            padding: 16,
            line_spacing: 8,
            scale: 1.0,
            video_width: 720,
            video_height: 1280,
        }
    }
}

impl TextOverlay {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}
