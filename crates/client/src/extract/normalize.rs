//! Transcript text normalization.
//!
//! Turns a raw transcript payload into one display-ready line. The upstream
//! speech engine emits a "thanks for watching" hallucination when a channel
//! carries tones or silence, so that phrase collapses to a fixed marker.

use regex::Regex;
use std::sync::LazyLock;

/// Marker for snapshots whose audio had no speech (tone-outs, dead air).
pub const NO_AUDIO: &str = "-- FIRE TONE OR NO AUDIO --";

/// Marker for snapshots with an empty or missing transcript.
pub const NO_TRANSCRIPT: &str = "No transcript available";

static NO_SPEECH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)thanks\s*for\s*watching|thank\s*you\s*for\s*watching").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a raw transcript to a non-empty single line.
///
/// - Any "thanks/thank you for watching" (case-insensitive) yields [`NO_AUDIO`].
/// - Otherwise whitespace runs, including line breaks, become one space and the
///   ends are trimmed.
/// - An empty result yields [`NO_TRANSCRIPT`].
pub fn normalize_transcript(raw: &str) -> String {
    if NO_SPEECH.is_match(raw) {
        return NO_AUDIO.to_string();
    }

    let collapsed = WHITESPACE.replace_all(raw, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() { NO_TRANSCRIPT.to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_transcript("Hello\nworld  "), "Hello world");
        let raw = "  Engine 4\r\n\tresponding   to  Main St. ";
        assert_eq!(normalize_transcript(raw), "Engine 4 responding to Main St.");
    }

    #[test]
    fn test_no_speech_phrases() {
        for raw in [
            "Thank you for watching",
            "thanks for watching!",
            "THANK YOU FOR WATCHING.",
            "Thanksfor watching",
            "Medic 2 en route. Thank you\nfor watching",
        ] {
            assert_eq!(normalize_transcript(raw), NO_AUDIO, "{raw:?}");
        }
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_transcript(""), NO_TRANSCRIPT);
        assert_eq!(normalize_transcript(" \n\t\r\n "), NO_TRANSCRIPT);
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize_transcript("Smoke reported."), "Smoke reported.");
        assert_eq!(normalize_transcript("Watching the fire line"), "Watching the fire line");
    }

    #[test]
    fn test_output_is_single_line() {
        let out = normalize_transcript("a\n\nb\r\nc\u{2028}d");
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
        assert_eq!(out, "a b c d");
    }
}
