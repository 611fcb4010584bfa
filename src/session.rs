use crate::core::error::{GaussError, StateError};
use crate::document::{DocumentLoader, DocumentPayload, SourceKind};
use crate::prompt::PromptTemplate;
use crate::providers::{FragmentStream, LLMProvider, Message, ProviderRegistry, Role};
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

/// Everything needed to bind a document to a chat client
#[derive(Clone)]
pub struct InitRequest {
    pub kind: SourceKind,
    pub payload: DocumentPayload,
    pub provider: String,
    pub model: String,
    pub credential: String,
}

impl fmt::Debug for InitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitRequest")
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// A prompt template bound to a live chat client
pub struct Session {
    provider_name: String,
    kind: SourceKind,
    template: PromptTemplate,
    client: Box<dyn LLMProvider>,
}

impl Session {
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider_name)
            .field("model", &self.model())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Session-scoped conversation state for one interactive user.
///
/// Uninitialized until [`Conversation::initialize`] succeeds; history is
/// only ever appended a whole turn at a time.
pub struct Conversation {
    loader: Arc<dyn DocumentLoader>,
    registry: Arc<ProviderRegistry>,
    session: Option<Session>,
    history: Vec<Message>,
}

impl Conversation {
    pub fn new(loader: Arc<dyn DocumentLoader>, registry: Arc<ProviderRegistry>) -> Self {
        Self {
            loader,
            registry,
            session: None,
            history: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Loads the document, builds the prompt and binds a new client.
    ///
    /// On failure the previous session and its history stay in place.
    pub async fn initialize(&mut self, request: InitRequest) -> Result<&Session, GaussError> {
        let provider_name = self
            .registry
            .validate(&request.provider, &request.model)?
            .name
            .clone();

        let document = self.loader.load(request.kind, request.payload).await?;
        let template = PromptTemplate::build(request.kind, &document);
        let client = self
            .registry
            .resolve(&request.provider, &request.model, &request.credential)?;

        tracing::info!(
            provider = %provider_name,
            model = %request.model,
            kind = %request.kind,
            "Session initialized"
        );

        self.history.clear();
        Ok(self.session.insert(Session {
            provider_name,
            kind: request.kind,
            template,
            client,
        }))
    }

    /// Starts a turn and returns the reply as a stream of fragments.
    ///
    /// The user and assistant messages are appended together once the
    /// stream is exhausted without error; an error or an early drop leaves
    /// the history as it was.
    pub async fn submit_turn(&mut self, user_text: &str) -> Result<ReplyStream<'_>, GaussError> {
        let session = self.session.as_ref().ok_or(StateError::NotInitialized)?;
        if user_text.trim().is_empty() {
            return Err(GaussError::Input("Message is empty".to_string()));
        }

        let messages = session.template.render(&self.history, user_text);
        let fragments = session.client.get_response_stream(&messages).await?;

        Ok(ReplyStream {
            fragments,
            history: &mut self.history,
            user_text: user_text.to_string(),
            reply: String::new(),
            finished: false,
        })
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }
}

/// Assistant reply for one turn; commits the turn to history when exhausted.
pub struct ReplyStream<'a> {
    fragments: FragmentStream,
    history: &'a mut Vec<Message>,
    user_text: String,
    reply: String,
    finished: bool,
}

impl ReplyStream<'_> {
    /// Text received so far
    pub fn reply(&self) -> &str {
        &self.reply
    }
}

impl Stream for ReplyStream<'_> {
    type Item = Result<String, GaussError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.fragments.as_mut().poll_next(cx)) {
            Some(Ok(fragment)) => {
                this.reply.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Some(Err(e)) => {
                this.finished = true;
                tracing::warn!(error = %e, "Reply stream failed; turn discarded");
                Poll::Ready(Some(Err(e)))
            }
            None => {
                this.finished = true;
                this.history.push(Message::new(
                    Role::User,
                    std::mem::take(&mut this.user_text),
                ));
                this.history
                    .push(Message::new(Role::Assistant, this.reply.clone()));
                tracing::debug!(messages = this.history.len(), "Turn committed");
                Poll::Ready(None)
            }
        }
    }
}
