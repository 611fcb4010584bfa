use crate::core::error::LoadError;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const LABEL: &str = "Youtube";

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[?&]v=|youtu\.be/|/shorts/|/embed/|/live/)([A-Za-z0-9_-]{11})")
        .expect("video id pattern")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

/// Fetches the caption text of a video as one space-joined blob.
pub async fn load(http: &Client, url: &str, languages: &[String]) -> Result<String, LoadError> {
    let video_id = video_id(url)?;
    let watch_url = format!("{}{}", WATCH_URL, video_id);

    let page = fetch(http, &watch_url).await?;
    let tracks = caption_tracks(&page);
    let track = pick_track(&tracks, languages)
        .ok_or_else(|| LoadError::NoTranscript(video_id.clone()))?;
    tracing::debug!(
        %video_id,
        language = %track.language_code,
        generated = track.kind.as_deref() == Some("asr"),
        "Fetching caption track"
    );

    let xml = fetch(http, &track.base_url).await?;
    let transcript = transcript_text(&xml)?;
    if transcript.trim().is_empty() {
        return Err(LoadError::NoTranscript(video_id));
    }
    Ok(transcript)
}

pub fn video_id(url: &str) -> Result<String, LoadError> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| LoadError::Malformed {
            kind: LABEL,
            reason: format!("no video id in '{}'", url),
        })
}

async fn fetch(http: &Client, url: &str) -> Result<String, LoadError> {
    let response = http
        .get(url)
        .header("Accept-Language", "en-US,en;q=0.8")
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| LoadError::Unreachable(e.to_string()))?;
    response
        .text()
        .await
        .map_err(|e| LoadError::Unreachable(e.to_string()))
}

/// Reads the `captionTracks` array embedded in the watch page.
fn caption_tracks(page: &str) -> Vec<CaptionTrack> {
    const MARKER: &str = "\"captionTracks\":";
    let Some(start) = page.find(MARKER) else {
        return Vec::new();
    };
    let json = &page[start + MARKER.len()..];
    serde_json::Deserializer::from_str(json)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default()
}

fn pick_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages
        .iter()
        .find_map(|lang| {
            tracks
                .iter()
                .find(|t| t.language_code.eq_ignore_ascii_case(lang))
        })
        .or_else(|| tracks.first())
}

/// Joins the cue texts of a timed-text document (`<text>` or `<p>` cues).
fn transcript_text(xml: &str) -> Result<String, LoadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut cues = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if matches!(e.name().as_ref(), b"text" | b"p") => depth += 1,
            Ok(Event::End(e)) if matches!(e.name().as_ref(), b"text" | b"p") => {
                depth = depth.saturating_sub(1)
            }
            Ok(Event::Text(e)) if depth > 0 => {
                let once = e.unescape().map_err(|e| LoadError::Malformed {
                    kind: LABEL,
                    reason: e.to_string(),
                })?;
                // caption bodies are escaped twice (`&amp;#39;`)
                let text = unescape(&once)
                    .map(|twice| twice.into_owned())
                    .unwrap_or_else(|_| once.to_string());
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !text.is_empty() {
                    cues.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoadError::Malformed {
                    kind: LABEL,
                    reason: format!("caption XML: {}", e),
                });
            }
        }
    }

    Ok(cues.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_video_id_from_common_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(video_id(url).unwrap(), "dQw4w9WgXcQ", "{}", url);
        }
        assert!(matches!(
            video_id("https://www.youtube.com/feed/trending"),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn reads_caption_tracks_and_prefers_configured_language() {
        let page = r#"ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://example.com/tt?lang=pt","name":{"runs":[{"text":"Portuguese"}]},"languageCode":"pt"},{"baseUrl":"https://example.com/tt?lang=en","languageCode":"en","kind":"asr"}],"audioTracks":[]}}};"#;

        let tracks = caption_tracks(page);
        assert_eq!(tracks.len(), 2);

        let en = pick_track(&tracks, &["en".to_string()]).unwrap();
        assert_eq!(en.base_url, "https://example.com/tt?lang=en");

        let fallback = pick_track(&tracks, &["de".to_string()]).unwrap();
        assert_eq!(fallback.language_code, "pt");
    }

    #[test]
    fn page_without_captions_has_no_tracks() {
        assert!(caption_tracks("<html>no player here</html>").is_empty());
    }

    #[test]
    fn joins_cues_and_decodes_double_escaped_entities() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.1">It&amp;#39;s   $500</text><text start="2.6" dur="1.0">of revenue</text></transcript>"#;

        assert_eq!(transcript_text(xml).unwrap(), "It's $500 of revenue");
    }

    #[test]
    fn reads_format_three_paragraph_cues() {
        let xml = r#"<timedtext format="3"><body><p t="0" d="1500">hello</p><p t="1500" d="900">world</p></body></timedtext>"#;

        assert_eq!(transcript_text(xml).unwrap(), "hello world");
    }
}
