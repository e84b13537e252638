//! YouTube transcript provider.
//!
//! Scrapes the caption track list from a video's watch page, then downloads
//! and parses the timed-text XML for the preferred language.

use super::{TranscriptProvider, TranscriptSnippet};
use crate::error::{LeseError, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for the watch page and caption downloads.
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Caption track descriptor from the watch page player response.
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Transcript provider backed by YouTube caption tracks.
pub struct YoutubeTranscriptProvider {
    client: reqwest::Client,
    language: String,
}

impl YoutubeTranscriptProvider {
    /// Create a provider preferring captions in the given language.
    pub fn new(language: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            language: language.to_string(),
        }
    }

    /// Download the watch page and pull out its caption track list.
    async fn fetch_caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        let url = url::Url::parse_with_params("https://www.youtube.com/watch", [("v", video_id)])
            .map_err(|e| LeseError::Transcript(format!("Bad watch URL: {}", e)))?;

        let page = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LeseError::Transcript(format!("Failed to fetch watch page: {}", e)))?
            .error_for_status()
            .map_err(|e| LeseError::Transcript(format!("Watch page request failed: {}", e)))?
            .text()
            .await
            .map_err(|e| LeseError::Transcript(format!("Failed to read watch page: {}", e)))?;

        let json = extract_caption_tracks_json(&page).ok_or_else(|| {
            LeseError::Transcript(format!("No caption tracks found for video {}", video_id))
        })?;

        serde_json::from_str(json)
            .map_err(|e| LeseError::Transcript(format!("Failed to parse caption tracks: {}", e)))
    }

    /// Pick the configured language if available, otherwise the first track.
    fn select_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        tracks
            .iter()
            .find(|t| t.language_code == self.language)
            .or_else(|| tracks.first())
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSnippet>> {
        let tracks = self.fetch_caption_tracks(video_id).await?;
        let track = self
            .select_track(&tracks)
            .ok_or_else(|| LeseError::Transcript(format!("Video {} has no captions", video_id)))?;

        debug!("Using caption track: {}", track.language_code);

        let xml = self
            .client
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| LeseError::Transcript(format!("Failed to fetch captions: {}", e)))?
            .error_for_status()
            .map_err(|e| LeseError::Transcript(format!("Caption download failed: {}", e)))?
            .text()
            .await
            .map_err(|e| LeseError::Transcript(format!("Failed to read captions: {}", e)))?;

        parse_timedtext(&xml)
    }
}

/// Locate the `captionTracks` JSON array inside the watch page HTML.
///
/// The array is found by scanning for the matching close bracket rather
/// than another regex, since track names may themselves contain brackets.
fn extract_caption_tracks_json(page: &str) -> Option<&str> {
    let marker = "\"captionTracks\":";
    let rest = &page[page.find(marker)? + marker.len()..];
    let open = rest.find('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in rest.as_bytes().iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[open..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a timed-text XML document into ordered snippets.
pub(crate) fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSnippet>> {
    let mut reader = quick_xml::Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut snippets = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"text" => {
                let mut start = 0.0;
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"start" {
                        start = std::str::from_utf8(&attr.value)
                            .ok()
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(0.0);
                    }
                }
                current_start = Some(start);
                current_text.clear();
            }
            Ok(Event::Text(te)) if current_start.is_some() => {
                current_text.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"text" => {
                if let Some(start_seconds) = current_start.take() {
                    snippets.push(TranscriptSnippet {
                        text: std::mem::take(&mut current_text),
                        start_seconds,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(LeseError::Transcript(format!("Bad caption XML: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(snippets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <transcript>
              <text start="0.12" dur="3.4">Hello there</text>
              <text start="3.52" dur="2.0">General &amp; specific</text>
            </transcript>"#;

        let snippets = parse_timedtext(xml).unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].text, "Hello there");
        assert!((snippets[0].start_seconds - 0.12).abs() < 1e-9);
        assert_eq!(snippets[1].text, "General & specific");
        assert!((snippets[1].start_seconds - 3.52).abs() < 1e-9);
    }

    #[test]
    fn test_parse_timedtext_empty_document() {
        let snippets = parse_timedtext("<transcript></transcript>").unwrap();
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_extract_caption_tracks_json() {
        let page = r#"stuff before "captionTracks":[{"baseUrl":"https://example.invalid/tt?x=1","name":{"simpleText":"English [auto]"},"languageCode":"en"}],"more":"after""#;

        let json = extract_caption_tracks_json(page).unwrap();
        let tracks: Vec<CaptionTrack> = serde_json::from_str(json).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "en");
        assert_eq!(tracks[0].base_url, "https://example.invalid/tt?x=1");
    }

    #[test]
    fn test_extract_caption_tracks_json_missing() {
        assert!(extract_caption_tracks_json("<html>no captions here</html>").is_none());
    }

    #[test]
    fn test_select_track_prefers_configured_language() {
        let provider = YoutubeTranscriptProvider::new("no");
        let tracks = vec![
            CaptionTrack {
                base_url: "a".to_string(),
                language_code: "en".to_string(),
            },
            CaptionTrack {
                base_url: "b".to_string(),
                language_code: "no".to_string(),
            },
        ];

        assert_eq!(provider.select_track(&tracks).unwrap().base_url, "b");

        let provider = YoutubeTranscriptProvider::new("de");
        assert_eq!(provider.select_track(&tracks).unwrap().base_url, "a");
    }
}
