#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use gauss::document::{DocumentLoader, DocumentPayload, LoadedDocument, SourceKind};
use gauss::providers::{FragmentStream, LLMProvider, Message, ProviderRegistry, ProviderSpec};
use gauss::session::{Conversation, InitRequest};
use gauss::{GaussError, LoadError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const PROVIDER: &str = "ProviderA";
pub const MODEL: &str = "model-x";

/// One scripted reply: fragments, optionally followed by a stream error
#[derive(Clone)]
pub struct ScriptedReply {
    pub fragments: Vec<String>,
    pub fail_with: Option<String>,
}

impl ScriptedReply {
    pub fn ok(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            fail_with: None,
        }
    }

    pub fn failing_after(fragments: &[&str], message: &str) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            fail_with: Some(message.to_string()),
        }
    }
}

/// Calls seen by every client built from one registry
#[derive(Clone, Default)]
pub struct Recorder {
    pub calls: Arc<Mutex<Vec<Vec<Message>>>>,
    pub replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    pub constructed: Arc<Mutex<Vec<(String, String)>>>,
}

impl Recorder {
    pub fn script(&self, reply: ScriptedReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn constructed(&self) -> Vec<(String, String)> {
        self.constructed.lock().unwrap().clone()
    }
}

pub struct ScriptedProvider {
    model: String,
    recorder: Recorder,
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn get_response_stream(&self, messages: &[Message]) -> Result<FragmentStream, GaussError> {
        self.recorder.calls.lock().unwrap().push(messages.to_vec());
        let reply = self
            .recorder
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::ok(&["ok"]));

        let mut items: Vec<Result<String, GaussError>> =
            reply.fragments.into_iter().map(Ok).collect();
        if let Some(message) = reply.fail_with {
            items.push(Err(GaussError::Api(message)));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Registry with a single scripted provider offering `model-x` and `model-y`
pub fn scripted_registry(recorder: &Recorder) -> ProviderRegistry {
    let recorder = recorder.clone();
    ProviderRegistry::empty().register(ProviderSpec::new(
        PROVIDER,
        &[MODEL, "model-y"],
        "http://localhost:0",
        move |config| {
            recorder
                .constructed
                .lock()
                .unwrap()
                .push((config.model.clone(), config.api_key.clone()));
            Ok(Box::new(ScriptedProvider {
                model: config.model.clone(),
                recorder: recorder.clone(),
            }) as Box<dyn LLMProvider>)
        },
    ))
}

/// Loader that treats bytes as UTF-8 text and URLs as fixed pages
pub struct FakeLoader {
    pub fail: bool,
}

#[async_trait]
impl DocumentLoader for FakeLoader {
    async fn load(
        &self,
        kind: SourceKind,
        payload: DocumentPayload,
    ) -> Result<LoadedDocument, LoadError> {
        if self.fail {
            return Err(LoadError::Unreachable("fixture offline".to_string()));
        }
        let text = match payload {
            DocumentPayload::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            DocumentPayload::Url(url) => format!("Contents of {}", url),
        };
        LoadedDocument::new(kind, text)
    }
}

pub fn conversation(recorder: &Recorder) -> Conversation {
    Conversation::new(
        Arc::new(FakeLoader { fail: false }),
        Arc::new(scripted_registry(recorder)),
    )
}

pub fn text_request(text: &str) -> InitRequest {
    InitRequest {
        kind: SourceKind::Text,
        payload: DocumentPayload::Bytes(text.as_bytes().to_vec()),
        provider: PROVIDER.to_string(),
        model: MODEL.to_string(),
        credential: "k".to_string(),
    }
}
