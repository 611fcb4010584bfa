use std::io;
use thiserror::Error;

/// Failures while turning a source into a `LoadedDocument`
#[derive(Error, Debug)]
pub enum LoadError {
    /// Nothing was supplied for the selected source kind
    #[error("No {0} was provided")]
    MissingPayload(&'static str),

    /// The source could not be fetched or read
    #[error("Source unreachable: {0}")]
    Unreachable(String),

    /// The input is not valid for its declared kind
    #[error("Malformed {kind} source: {reason}")]
    Malformed { kind: &'static str, reason: String },

    /// The source parsed but produced no text
    #[error("The {0} source contains no text")]
    Empty(&'static str),

    /// The video has no caption track to read
    #[error("No transcript available for video {0}")]
    NoTranscript(String),
}

/// Provider/model selection errors, raised before any network call
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown model '{model}' for provider {provider}")]
    UnknownModel { provider: String, model: String },

    #[error("No API key configured for provider {0}")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("No document loaded yet. Use /load <kind> <source> to initialize Gauss.")]
    NotInitialized,
}

/// Unified error type for the application
#[derive(Error, Debug)]
pub enum GaussError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    /// Credential rejected by the provider on first use
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// API-related errors
    #[error("API error: {0}")]
    Api(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for GaussError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GaussError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            GaussError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            GaussError::Api(format!("API returned error status: {}", err))
        } else {
            GaussError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for GaussError {
    fn from(err: serde_json::Error) -> Self {
        GaussError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for GaussError {
    fn from(err: serde_yml::Error) -> Self {
        GaussError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<rustyline::error::ReadlineError> for GaussError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        GaussError::Input(format!("Line editor error: {}", err))
    }
}
