const ELLIPSIS: &str = "...";

/// Shortens a vendor response body for logs and job error text, and masks
/// credentials that services sometimes echo back.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total = trimmed.chars().count();
    let shortened = if total > max_chars {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{}{} ({} chars total)", head, ELLIPSIS, total)
    } else {
        trimmed.to_string()
    };

    redact_credentials(&shortened)
}

fn redact_credentials(text: &str) -> String {
    let patterns = [
        "Bearer ",
        "AccessKey: ",
        "X-Api-Key: ",
        "api_key=",
        "token=",
    ];

    let mut result = text.to_string();
    for pattern in patterns {
        let mut from = 0;
        while let Some(found) = result[from..].find(pattern) {
            let value_start = from + found + pattern.len();
            let value_end = result[value_start..]
                .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'' || c == ',')
                .map(|i| value_start + i)
                .unwrap_or(result.len());
            result.replace_range(value_start..value_end, "[REDACTED]");
            from = value_start + "[REDACTED]".len();
        }
    }

    result
}
