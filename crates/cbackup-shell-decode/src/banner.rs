//! Error banner cleaning and message extraction.

use cbackup_shell_screen::render_to_text;

/// Render a raw banner through the screen buffer and decode residual
/// HTML entities, yielding the plain text an operator would read.
pub fn clean_banner(raw: &str) -> String {
    decode_entities(&render_to_text(raw.as_bytes()))
}

/// Decode the HTML entities that can survive in scheduler banner text.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Pick the operative message out of a cleaned banner.
///
/// The scheduler's banners conventionally put a header on the first line and
/// the human-readable message on the second; when that line is missing or
/// blank the whole cleaned text is returned. This is a positional heuristic
/// against observed output, not a structured protocol - if the banner format
/// ever grows or loses a line, this picks the wrong text rather than fail.
pub fn banner_message(clean: &str) -> String {
    match clean.split('\n').nth(1) {
        Some(line) if !line.is_empty() => line.to_string(),
        _ => clean.to_string(),
    }
}
