use crate::domain::TextOverlay;

use super::filter_graph::{Filter, FilterChain};

const DEFAULT_FONT: &str = "Arial";

fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

fn escape_font(font: &str) -> String {
    font.replace(',', "\\,")
        .replace(' ', "\\ ")
        .replace('\'', "")
        .trim()
        .to_string()
}

fn hex(color: &str) -> &str {
    color.trim_start_matches('#')
}

fn scaled(value: u32, scale: f32) -> u32 {
    (value as f32 * scale).round().max(0.0) as u32
}

/// One centered `drawtext` per line of the overlay, stacked downwards from
/// `y_percent` of the frame height.
pub fn drawtext_chain(overlay: &TextOverlay) -> FilterChain {
    let scale = if overlay.scale > 0.0 { overlay.scale } else { 1.0 };
    let font_size = scaled(overlay.font_size, scale);
    let padding = scaled(overlay.padding, scale);
    let line_spacing = scaled(overlay.line_spacing, scale);
    let top = (overlay.y_percent / 100.0 * overlay.video_height as f32).round() as i64;

    let font = overlay
        .font_family
        .as_deref()
        .filter(|f| !f.trim().is_empty() && *f != DEFAULT_FONT)
        .map(|family| {
            let modifiers: Vec<&str> = [(overlay.bold, "Bold"), (overlay.italic, "Italic")]
                .into_iter()
                .filter_map(|(on, name)| on.then_some(name))
                .collect();
            if modifiers.is_empty() {
                escape_font(family)
            } else {
                format!("{}-{}", escape_font(family), modifiers.join("-"))
            }
        });

    let filters = overlay
        .lines()
        .enumerate()
        .map(|(index, line)| {
            let line = if line.is_empty() { " " } else { line };
            let y = top + index as i64 * i64::from(font_size + line_spacing);
            let filter = Filter::new("drawtext")
                .option("text", format!("'{}'", escape_text(line)))
                .option("fontsize", font_size)
                .option("fontcolor", hex(&overlay.text_color))
                .option("x", "(w-text_w)/2")
                .option("y", y)
                .option("text_align", "center")
                .option("line_align", "center")
                .option("box", 1)
                .option(
                    "boxcolor",
                    format!("{}@{}", hex(&overlay.background_color), overlay.opacity),
                )
                .option("boxborderw", padding);
            match &font {
                Some(font) => filter.option("font", font),
                None => filter,
            }
        })
        .collect();

    FilterChain::new(filters)
}
