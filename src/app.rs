use crate::cli::Args;
use crate::commands::{ChatState, Selection, dispatcher::CommandDispatcher};
use crate::config::Config;
use crate::core::error::{GaussError, LoadError};
use crate::display;
use crate::document::{DocumentPayload, SourceKind};
use crate::input;
use crate::providers::ProviderRegistry;
use crate::session::{Conversation, InitRequest};
use futures::StreamExt;
use is_terminal::IsTerminal;
use std::io::{self, Read};

pub struct Application {
    pub args: Args,
    pub config: Config,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(args: Args, config: Config, command_dispatcher: CommandDispatcher) -> Self {
        Self {
            args,
            config,
            command_dispatcher,
        }
    }

    pub async fn run(&self, conversation: Conversation) -> Result<(), GaussError> {
        if self.args.list_models {
            display::display_models(conversation.registry());
            return Ok(());
        }

        let selection = initial_selection(&self.args, &self.config, conversation.registry())?;
        let mut state = ChatState::new(conversation, selection);

        match self.args.query.clone() {
            Some(query) => self.handle_single_question(&mut state, &query).await,
            None => self.handle_continuous_chat_mode(&mut state).await,
        }
    }

    async fn handle_single_question(
        &self,
        state: &mut ChatState,
        query: &str,
    ) -> Result<(), GaussError> {
        let kind = state.selection.kind.ok_or_else(|| {
            GaussError::Input("--kind is required when asking a question".to_string())
        })?;

        let piped = if state.selection.source.is_none() && !kind.takes_url() {
            read_piped_stdin()?
        } else {
            None
        };
        let payload = read_payload(kind, state.selection.source.as_deref(), piped)?;

        self.initialize(state, kind, payload).await?;
        stream_turn(state, query).await
    }

    async fn handle_continuous_chat_mode(&self, state: &mut ChatState) -> Result<(), GaussError> {
        if state.selection.kind.is_some() && state.selection.source.is_some() {
            state.load_requested = true;
            self.handle_load_request(state).await;
        } else {
            display::display_guidance(
                "No document loaded yet. Use /load <kind> <source> to initialize Gauss.",
            );
        }

        println!(
            "Chat with Gauss. Type '/help' for available commands. Press Ctrl+D or type /quit to exit."
        );

        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            let input = match input::read_input(&mut editor)? {
                Some(input) => input.trim().to_string(),
                None => break,
            };

            if input.is_empty() {
                continue;
            }

            if let Some(command_line) = input.strip_prefix('/') {
                let (command, args) = command_line
                    .split_once(char::is_whitespace)
                    .unwrap_or((command_line, ""));
                if !command.is_empty() {
                    match self.command_dispatcher.execute(command, args, state) {
                        Ok(Some(output)) => println!("{}", output),
                        Ok(None) => {}
                        Err(e) => display::display_error(&e),
                    }

                    self.handle_load_request(state).await;
                    if !state.should_continue {
                        break;
                    }
                }
                continue;
            }

            if let Err(e) = stream_turn(state, &input).await {
                match e {
                    GaussError::State(state_error) => {
                        display::display_guidance(&state_error.to_string())
                    }
                    other => display::display_error(&other),
                }
            }
        }

        input::save_history(&mut editor)?;

        Ok(())
    }

    async fn handle_load_request(&self, state: &mut ChatState) {
        if !std::mem::take(&mut state.load_requested) {
            return;
        }

        let Some(kind) = state.selection.kind else {
            return;
        };
        let result = match read_payload(kind, state.selection.source.as_deref(), None) {
            Ok(payload) => self.initialize(state, kind, payload).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            display::display_error(&e);
            if state.conversation.is_ready() {
                display::display_guidance("The previous document is still loaded.");
            }
        }
    }

    async fn initialize(
        &self,
        state: &mut ChatState,
        kind: SourceKind,
        payload: DocumentPayload,
    ) -> Result<(), GaussError> {
        let credential = self.credential_for(state)?;
        let request = InitRequest {
            kind,
            payload,
            provider: state.selection.provider.clone(),
            model: state.selection.model.clone(),
            credential,
        };

        let session = state.conversation.initialize(request).await?;
        display::display_session_ready(session);
        Ok(())
    }

    /// `--api-key` beats the config file, which beats the provider's env variable.
    fn credential_for(&self, state: &ChatState) -> Result<String, GaussError> {
        if let Some(key) = self.args.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        let spec = state
            .conversation
            .registry()
            .spec(&state.selection.provider)?;
        Ok(self.config.credential_for(spec).unwrap_or_default())
    }
}

/// Streams one reply to stdout as it is generated
async fn stream_turn(state: &mut ChatState, text: &str) -> Result<(), GaussError> {
    let mut reply = state.conversation.submit_turn(text).await?;
    display::display_assistant_prefix();

    while let Some(fragment) = reply.next().await {
        match fragment {
            Ok(fragment) => display::display_fragment(&fragment)?,
            Err(e) => {
                println!();
                return Err(e);
            }
        }
    }

    display::finish_reply(reply.reply());
    Ok(())
}

/// CLI flag, then config file, then the registry's first entry.
pub fn initial_selection(
    args: &Args,
    config: &Config,
    registry: &ProviderRegistry,
) -> Result<Selection, GaussError> {
    let provider_name = args
        .provider
        .clone()
        .or_else(|| config.active_provider.clone())
        .or_else(|| registry.providers().first().map(|s| s.name.clone()))
        .ok_or_else(|| GaussError::Input("No providers are registered".to_string()))?;
    let spec = registry.spec(&provider_name)?;

    let model = match &args.model {
        Some(model) => model.clone(),
        None => config
            .active_model
            .clone()
            .filter(|m| spec.supports(m))
            .or_else(|| spec.default_model().map(str::to_string))
            .unwrap_or_default(),
    };

    Ok(Selection {
        kind: args.kind,
        source: args.source.clone(),
        provider: spec.name.clone(),
        model,
    })
}

/// Builds the payload: a URL for site/video, file bytes (or piped stdin) otherwise.
pub fn read_payload(
    kind: SourceKind,
    source: Option<&str>,
    piped: Option<Vec<u8>>,
) -> Result<DocumentPayload, GaussError> {
    if kind.takes_url() {
        return Ok(DocumentPayload::Url(source.unwrap_or_default().to_string()));
    }

    match (source.map(str::trim).filter(|s| !s.is_empty()), piped) {
        (Some(path), _) => std::fs::read(path)
            .map(DocumentPayload::Bytes)
            .map_err(|e| GaussError::from(LoadError::Unreachable(format!("{}: {}", path, e)))),
        (None, Some(bytes)) => Ok(DocumentPayload::Bytes(bytes)),
        (None, None) => Err(LoadError::MissingPayload(kind.payload_name()).into()),
    }
}

fn read_piped_stdin() -> Result<Option<Vec<u8>>, GaussError> {
    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .map_err(|e| GaussError::Input(format!("Failed to read from stdin: {}", e)))?;
    Ok(Some(buffer))
}
