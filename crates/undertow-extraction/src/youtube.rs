//! YouTube transcript extractor.
//!
//! Transcripts are fetched through the transcript API rather than the
//! watch page; manually created tracks win over auto-generated ones, in
//! the language order ko, en, ja, zh-Hans.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use undertow_fetch::HttpFetcher;
use yt_transcript_rs::YouTubeTranscriptApi;

use crate::Extractor;

const TRANSCRIPT_LANGUAGES: &[&str] = &["ko", "en", "ja", "zh-Hans"];

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video-id pattern is a valid regex")
});

/// Extract the 11-character video id from watch/embed/short-link URLs.
pub fn video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn format_time(seconds: f64) -> String {
    let total = seconds.round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

pub struct YoutubeExtractor;

impl YoutubeExtractor {
    pub fn new() -> Self {
        Self
    }

    async fn transcript(&self, id: &str) -> String {
        let api = match YouTubeTranscriptApi::new(None, None, None) {
            Ok(api) => api,
            Err(e) => {
                debug!(error = %e, "transcript api init failed");
                return String::new();
            }
        };

        let transcript = match api.fetch_transcript(id, TRANSCRIPT_LANGUAGES, false).await {
            Ok(t) => t,
            Err(e) => {
                debug!(video = id, error = %e, "transcript fetch failed");
                return String::new();
            }
        };

        let mut out = String::from("### Transcript\n");
        for snippet in &transcript.snippets {
            let start = snippet.start;
            let end = start + snippet.duration;
            out.push_str(&format!(
                "[{} - {}]: {}\n",
                format_time(start),
                format_time(end),
                snippet.text
            ));
        }
        out
    }
}

impl Default for YoutubeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for YoutubeExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("youtube.com")
    }

    async fn extract(&self, url: &str, _fetcher: &HttpFetcher) -> String {
        match video_id(url) {
            Some(id) => self.transcript(&id).await,
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_from_watch_embed_and_short_urls() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=A1S19JzHN2M"),
            Some("A1S19JzHN2M".to_string())
        );
        assert_eq!(
            video_id("https://youtube.com/embed/A1S19JzHN2M"),
            Some("A1S19JzHN2M".to_string())
        );
        assert_eq!(
            video_id("https://youtu.be/A1S19JzHN2M?t=10"),
            Some("A1S19JzHN2M".to_string())
        );
        assert_eq!(video_id("https://www.youtube.com/"), None);
    }

    #[test]
    fn timestamps_format_as_hms() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(61.4), "00:01:01");
        assert_eq!(format_time(3725.0), "01:02:05");
    }
}
