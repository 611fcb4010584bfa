use super::base_client::{HttpClient, StreamEvent};
use super::{FragmentStream, LLMProvider, Message};
use crate::core::error::GaussError;
use async_trait::async_trait;
use serde::Serialize;

/// Parser for OpenAI-compatible `data: {json}` stream lines
pub fn openai_stream_parser(line: &str) -> Result<StreamEvent, GaussError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(StreamEvent::Skip);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(StreamEvent::Skip);
    }
    if data == "[DONE]" {
        return Ok(StreamEvent::Done);
    }

    let parsed: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        GaussError::Serialization(format!("Failed to parse stream data: {}", e))
    })?;

    if let Some(message) = parsed
        .get("error")
        .and_then(|err| err.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(GaussError::Api(format!("Stream error: {}", message)));
    }

    let text = parsed
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default();

    if text.is_empty() {
        Ok(StreamEvent::Skip)
    } else {
        Ok(StreamEvent::Fragment(text.to_string()))
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat client for any `/chat/completions` endpoint with bearer auth
#[derive(Clone, Debug)]
pub struct OpenAICompatibleProvider {
    client: HttpClient,
    model: String,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: &str, model: String) -> Result<Self, GaussError> {
        let auth_header = Some(("Authorization".to_string(), format!("Bearer {}", api_key)));
        Ok(Self {
            client: HttpClient::new(base_url, auth_header)?,
            model,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn get_response_stream(&self, messages: &[Message]) -> Result<FragmentStream, GaussError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatCompletionMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream: true,
        };

        let response = self.client.post("chat/completions", &payload).await?;
        Ok(self.client.stream_response(response, openai_stream_parser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_deltas() {
        let line = r#"data: {"id":"c1","choices":[{"index":0,"delta":{"content":"S500"}}]}"#;
        assert_eq!(
            openai_stream_parser(line).unwrap(),
            StreamEvent::Fragment("S500".to_string())
        );
    }

    #[test]
    fn skips_role_only_deltas_and_non_data_lines() {
        let line = r#"data: {"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(openai_stream_parser(line).unwrap(), StreamEvent::Skip);
        assert_eq!(openai_stream_parser(": keep-alive").unwrap(), StreamEvent::Skip);
        assert_eq!(openai_stream_parser("").unwrap(), StreamEvent::Skip);
    }

    #[test]
    fn done_marker_ends_stream() {
        assert_eq!(openai_stream_parser("data: [DONE]").unwrap(), StreamEvent::Done);
    }

    #[test]
    fn error_events_become_api_errors() {
        let line = r#"data: {"error":{"message":"model overloaded"}}"#;
        assert!(matches!(
            openai_stream_parser(line),
            Err(GaussError::Api(msg)) if msg.contains("model overloaded")
        ));
    }
}
