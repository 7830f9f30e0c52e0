//! Frame decoding: JSON span extraction with banner fallback.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use cbackup_shell_core::{DecodedResult, Result};

use crate::banner::{banner_message, clean_banner};

lazy_static! {
    // Greedy single-line brace span; the scheduler emits its JSON payload on
    // one line. The first match wins.
    static ref JSON_SPAN: Regex = Regex::new(r"\{.*\}").unwrap();
}

/// Decode one stripped response frame.
///
/// If the frame contains a `{...}` span it is parsed as a JSON object and
/// returned verbatim as the success mapping; a span that fails to parse is a
/// [`cbackup_shell_core::Error::Decode`] - a protocol mismatch, not a
/// remote-side failure. A frame with no JSON span is treated as an error
/// banner: rendered to plain text, entity-decoded, and reduced to its
/// operative message. An empty frame is a failure with an empty message.
pub fn decode_frame(frame: &str) -> Result<DecodedResult> {
    if let Some(span) = JSON_SPAN.find(frame) {
        debug!(
            "Found JSON span: {} bytes at offset {}",
            span.as_str().len(),
            span.start()
        );
        let map: Map<String, Value> = serde_json::from_str(span.as_str())?;
        return Ok(DecodedResult::Success(map));
    }

    let message = banner_message(&clean_banner(frame));
    debug!("No JSON span in frame; banner message: {:?}", message);
    Ok(DecodedResult::Failure { message })
}
