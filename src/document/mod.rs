pub mod file;
pub mod loader;
pub mod site;
pub mod video;

use crate::core::error::{GaussError, LoadError};
use std::fmt;
use std::str::FromStr;

pub use loader::{DocumentLoader, LoaderSettings, SourceLoader};

/// Declared category of the document handed to Gauss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Site,
    Video,
    Pdf,
    Csv,
    Text,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Site,
        SourceKind::Video,
        SourceKind::Pdf,
        SourceKind::Csv,
        SourceKind::Text,
    ];

    /// Label shown to the model inside the system prompt
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Site => "Site",
            SourceKind::Video => "Youtube",
            SourceKind::Pdf => "PDF",
            SourceKind::Csv => "CSV",
            SourceKind::Text => "TXT",
        }
    }

    /// File extension used for the scoped temp file of byte-based kinds
    pub fn extension(&self) -> &'static str {
        match self {
            SourceKind::Site | SourceKind::Video => "",
            SourceKind::Pdf => "pdf",
            SourceKind::Csv => "csv",
            SourceKind::Text => "txt",
        }
    }

    pub fn takes_url(&self) -> bool {
        matches!(self, SourceKind::Site | SourceKind::Video)
    }

    /// What the user has to supply, used in error and help messages
    pub fn payload_name(&self) -> &'static str {
        match self {
            SourceKind::Site => "site URL",
            SourceKind::Video => "video URL",
            SourceKind::Pdf => "PDF file",
            SourceKind::Csv => "CSV file",
            SourceKind::Text => "text file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceKind {
    type Err = GaussError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "site" | "web" | "url" => Ok(SourceKind::Site),
            "video" | "youtube" => Ok(SourceKind::Video),
            "pdf" => Ok(SourceKind::Pdf),
            "csv" => Ok(SourceKind::Csv),
            "text" | "txt" => Ok(SourceKind::Text),
            other => Err(GaussError::Input(format!(
                "Unknown source kind '{}' (expected site, video, pdf, csv or text)",
                other
            ))),
        }
    }
}

/// Raw input for a loader, consumed by the load call
#[derive(Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    Url(String),
    Bytes(Vec<u8>),
}

impl fmt::Debug for DocumentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentPayload::Url(url) => f.debug_tuple("Url").field(url).finish(),
            DocumentPayload::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// Flat text of a loaded source; fragments are already joined in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument(String);

impl LoadedDocument {
    /// Rejects blank text so a document is never silently empty.
    pub fn new(kind: SourceKind, text: String) -> Result<Self, LoadError> {
        if text.trim().is_empty() {
            return Err(LoadError::Empty(kind.label()));
        }
        Ok(Self(text))
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
