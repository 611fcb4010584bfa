use crate::core::error::LoadError;
use crate::prompt::is_bot_challenge;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use reqwest::Client;
use std::sync::LazyLock;

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<!--.*?-->")
        .expect("hidden block pattern")
});
static BLOCK_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(br|/p|/div|/li|/tr|/h[1-6]|/title|/section|/article)\b[^>]*>")
        .expect("block break pattern")
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("entity pattern"));

/// Fetches a page and returns its visible text.
///
/// A bot-challenge page is returned as text even when served with an error
/// status, so the prompt can ask the user to reload.
pub async fn load(http: &Client, url: &str) -> Result<String, LoadError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| LoadError::Unreachable(format!("{}: {}", url, e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LoadError::Unreachable(format!("{}: {}", url, e)))?;

    let text = html_to_text(&body);
    if is_bot_challenge(&text) {
        tracing::warn!(%url, %status, "Site answered with a bot challenge page");
        return Ok(text);
    }
    if !status.is_success() {
        return Err(LoadError::Unreachable(format!("{} returned {}", url, status)));
    }

    Ok(text)
}

pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_BLOCKS.replace_all(html, " ");
    let broken = BLOCK_BREAKS.replace_all(&visible, "\n");
    let stripped = TAGS.replace_all(&broken, " ");

    stripped
        .lines()
        .map(|line| {
            decode_entities(line)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Unknown entities and bare `&` are left as written.
fn decode_entities(line: &str) -> String {
    ENTITY
        .replace_all(line, |caps: &Captures| {
            unescape_with(&caps[0], resolve_html5_entity)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_scripts_and_styles() {
        let html = r#"<html><head><title>Report</title><style>p { color: red; }</style>
            <script>var x = "<p>hidden</p>";</script></head>
            <body><h1>Q3 results</h1><p>Total revenue: $500 &amp; rising</p><!-- note --></body></html>"#;

        let text = html_to_text(html);

        assert_eq!(text, "Report\nQ3 results\nTotal revenue: $500 & rising");
    }

    #[test]
    fn decodes_entities_next_to_stray_ampersands() {
        assert_eq!(
            html_to_text("<p>AT&T&nbsp;&amp; R&D: &lt;b&gt; &#36;500 &#x24;5 &bogus;</p>"),
            "AT&T & R&D: <b> $500 $5 &bogus;"
        );
    }
}
