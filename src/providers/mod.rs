pub mod base_client;
pub mod openai_compatible;
pub mod registry;

use crate::core::error::GaussError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use registry::{ClientConfig, ProviderRegistry, ProviderSpec};

pub type FragmentStream = BoxStream<'static, Result<String, GaussError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: String) -> Self {
        Self { role, content }
    }
}

/// A chat client bound to one model and credential.
///
/// Construction never touches the network; a rejected credential shows up
/// as `GaussError::Auth` from the first request.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    fn model(&self) -> &str;

    async fn get_response_stream(&self, messages: &[Message]) -> Result<FragmentStream, GaussError>;
}
