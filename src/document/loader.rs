use super::{DocumentPayload, LoadedDocument, SourceKind, file, site, video};
use crate::core::error::LoadError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("gauss/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(
        &self,
        kind: SourceKind,
        payload: DocumentPayload,
    ) -> Result<LoadedDocument, LoadError>;
}

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    /// Caption languages tried in order before falling back to the first track
    pub caption_languages: Vec<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            caption_languages: vec!["en".to_string()],
        }
    }
}

/// Loads every `SourceKind` with the built-in adapters.
pub struct SourceLoader {
    http: Client,
    settings: LoaderSettings,
}

impl SourceLoader {
    pub fn new(settings: LoaderSettings) -> Result<Self, LoadError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Unreachable(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl DocumentLoader for SourceLoader {
    #[tracing::instrument(skip(self, payload), fields(kind = %kind))]
    async fn load(
        &self,
        kind: SourceKind,
        payload: DocumentPayload,
    ) -> Result<LoadedDocument, LoadError> {
        let text = match (kind, payload) {
            (SourceKind::Site, DocumentPayload::Url(url)) => {
                site::load(&self.http, require_url(kind, &url)?).await?
            }
            (SourceKind::Video, DocumentPayload::Url(url)) => {
                video::load(
                    &self.http,
                    require_url(kind, &url)?,
                    &self.settings.caption_languages,
                )
                .await?
            }
            (SourceKind::Pdf | SourceKind::Csv | SourceKind::Text, DocumentPayload::Bytes(bytes)) => {
                file::load(kind, bytes).await?
            }
            (kind, DocumentPayload::Bytes(_)) => {
                return Err(LoadError::Malformed {
                    kind: kind.label(),
                    reason: "expected a URL, got file contents".to_string(),
                });
            }
            (kind, DocumentPayload::Url(_)) => {
                return Err(LoadError::Malformed {
                    kind: kind.label(),
                    reason: "expected file contents, got a URL".to_string(),
                });
            }
        };

        let document = LoadedDocument::new(kind, text)?;
        tracing::info!(chars = document.len(), "Document loaded");
        Ok(document)
    }
}

fn require_url(kind: SourceKind, url: &str) -> Result<&str, LoadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LoadError::MissingPayload(kind.payload_name()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(LoadError::Malformed {
            kind: kind.label(),
            reason: format!("'{}' is not an http(s) URL", url),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_is_a_missing_payload() {
        assert!(matches!(
            require_url(SourceKind::Site, "  "),
            Err(LoadError::MissingPayload("site URL"))
        ));
    }

    #[test]
    fn non_http_url_is_malformed() {
        assert!(matches!(
            require_url(SourceKind::Video, "ftp://example.com/v"),
            Err(LoadError::Malformed { kind: "Youtube", .. })
        ));
    }
}
