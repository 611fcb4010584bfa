use super::ChatState;
use crate::core::error::GaussError;
use crate::display;
use crate::document::SourceKind;

use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, state: &mut ChatState, args: &str) -> Result<Option<String>, GaussError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct LoadCommand;
pub struct ProviderCommand;
pub struct ModelCommand;
pub struct ModelsCommand;
pub struct HistoryCommand;
pub struct StatusCommand;

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &str) -> Result<Option<String>, GaussError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &str,
    ) -> Result<Option<String>, GaussError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            LoadCommand.help().to_string(),
            ClearCommand.help().to_string(),
            HistoryCommand.help().to_string(),
            ProviderCommand.help().to_string(),
            ModelCommand.help().to_string(),
            ModelsCommand.help().to_string(),
            StatusCommand.help().to_string(),
            HelpCommand.help().to_string(),
            QuitCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(&self, state: &mut ChatState, _args: &str) -> Result<Option<String>, GaussError> {
        state.conversation.reset_history();
        Ok(Some("Conversation history cleared.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Clear conversation history (the loaded document stays)"
    }
}

impl CommandHandler for LoadCommand {
    fn execute(&self, state: &mut ChatState, args: &str) -> Result<Option<String>, GaussError> {
        let args = args.trim();
        if args.is_empty() {
            if state.selection.kind.is_none() || state.selection.source.is_none() {
                return Ok(Some("Usage: /load <kind> <source>".to_string()));
            }
        } else {
            let Some((kind, source)) = args.split_once(char::is_whitespace) else {
                return Ok(Some("Usage: /load <kind> <source>".to_string()));
            };
            state.selection.kind = Some(kind.parse::<SourceKind>()?);
            state.selection.source = Some(source.trim_start().to_string());
        }

        state.load_requested = true;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/load [<kind> <source>] - Load a site, video, pdf, csv or text file (reloads the last one when omitted)"
    }
}

impl CommandHandler for ProviderCommand {
    fn execute(&self, state: &mut ChatState, args: &str) -> Result<Option<String>, GaussError> {
        let Some(name) = args.split_whitespace().next() else {
            return Ok(Some(format!("Current provider: {}", state.selection.provider)));
        };

        let spec = state.conversation.registry().spec(name)?;
        state.selection.provider = spec.name.clone();
        if !spec.supports(&state.selection.model) {
            state.selection.model = spec.default_model().unwrap_or_default().to_string();
        }
        Ok(Some(format!(
            "Provider set to {} ({}). Run /load to apply.",
            state.selection.provider, state.selection.model
        )))
    }

    fn help(&self) -> &'static str {
        "/provider <name> - Show or change the provider used by the next /load"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, state: &mut ChatState, args: &str) -> Result<Option<String>, GaussError> {
        let Some(model) = args.split_whitespace().next() else {
            return Ok(Some(format!("Current model: {}", state.selection.model)));
        };

        state
            .conversation
            .registry()
            .validate(&state.selection.provider, model)?;
        state.selection.model = model.to_string();
        Ok(Some(format!(
            "Model set to {}. Run /load to apply.",
            state.selection.model
        )))
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the model used by the next /load"
    }
}

impl CommandHandler for ModelsCommand {
    fn execute(&self, state: &mut ChatState, _args: &str) -> Result<Option<String>, GaussError> {
        display::display_models(state.conversation.registry());
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/models - List providers and their models"
    }
}

impl CommandHandler for HistoryCommand {
    fn execute(&self, state: &mut ChatState, _args: &str) -> Result<Option<String>, GaussError> {
        display::display_history(state.conversation.history());
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/history - Show the conversation so far"
    }
}

impl CommandHandler for StatusCommand {
    fn execute(&self, state: &mut ChatState, _args: &str) -> Result<Option<String>, GaussError> {
        display::display_status(
            state.conversation.session(),
            state.conversation.history().len(),
        );
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/status - Show the loaded document and model"
    }
}
