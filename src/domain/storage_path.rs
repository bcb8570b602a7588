use std::fmt;

use chrono::Utc;
use uuid::Uuid;

/// Object key under which a produced media file is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// `{folder}/{name}-{unix_millis}-{suffix}.{extension}`; the timestamp and
    /// random suffix keep concurrent uploads of the same clip apart.
    pub fn new(folder: &str, name: &str, extension: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}/{}-{}-{}.{}",
            folder.trim_matches('/'),
            sanitize_segment(name),
            Utc::now().timestamp_millis(),
            &suffix[..12],
            extension.trim_start_matches('.'),
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cases and reduces a name to `[a-z0-9-]`, with single hyphens.
pub fn sanitize_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_was_hyphen = true;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_was_hyphen = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !prev_was_hyphen {
            out.push('-');
            prev_was_hyphen = true;
        }
    }

    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "clip".to_string()
    } else {
        trimmed.to_string()
    }
}
