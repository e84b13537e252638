//! Video transcript retrieval.

mod youtube;

pub use youtube::YoutubeTranscriptProvider;

use crate::error::{LeseError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A timed fragment of a video transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    /// Text content of the snippet.
    pub text: String,
    /// Offset from the start of the video in seconds.
    pub start_seconds: f64,
}

/// Trait for transcript retrieval.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript of a video as chronologically ordered snippets.
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSnippet>>;
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Matches various YouTube URL formats and bare video IDs
        Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    })
}

/// Extract a video identifier from a URL or bare ID.
pub fn parse_video_reference(input: &str) -> Result<String> {
    video_id_regex()
        .captures(input.trim())
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            LeseError::InvalidVideoReference(format!(
                "Not a recognized video URL or ID: {}",
                input
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_reference_url_shapes() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(parse_video_reference(input).unwrap(), "dQw4w9WgXcQ");
        }
    }

    #[test]
    fn test_bare_id_and_short_url_resolve_the_same() {
        let from_url = parse_video_reference("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let from_id = parse_video_reference("dQw4w9WgXcQ").unwrap();
        assert_eq!(from_url, from_id);
    }

    #[test]
    fn test_unrecognized_references_fail() {
        for input in ["https://example.com/video", "not-a-video-id", "", "short"] {
            let err = parse_video_reference(input).unwrap_err();
            assert!(matches!(err, LeseError::InvalidVideoReference(_)));
        }
    }
}
