use crate::document::{LoadedDocument, SourceKind};
use crate::providers::{Message, Role};
use regex::Regex;
use std::sync::LazyLock;

pub const ASSISTANT_NAME: &str = "Gauss";

/// Placeholder text served by bot-protection pages instead of real content
pub const BOT_CHALLENGE_TEXT: &str = "Just a moment...Enable JavaScript and cookies to continue";

static BOT_CHALLENGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)just a moment\s*(\.\.\.|…)|enable javascript and cookies to continue")
        .expect("bot challenge pattern")
});

pub fn is_bot_challenge(text: &str) -> bool {
    BOT_CHALLENGE.is_match(text)
}

/// System instruction bound to one loaded document.
///
/// The history and the current user input are the two slots filled on
/// every turn by [`PromptTemplate::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system_message: String,
}

impl PromptTemplate {
    pub fn build(kind: SourceKind, document: &LoadedDocument) -> Self {
        if is_bot_challenge(document.text()) {
            tracing::warn!(%kind, "Document looks like a bot challenge page");
        }

        let system_message = format!(
            "You are a friendly assistant named {name}.\n\
             You have access to the following information from a {kind} document:\n\
             \n\
             ####\n\
             {document}\n\
             ####\n\
             \n\
             Use the information provided to ground your answers.\n\
             \n\
             Whenever there is a $ in your output, replace it with S.\n\
             \n\
             If the document information is something like \"{challenge}\", \
             suggest that the user load {name} again!",
            name = ASSISTANT_NAME,
            kind = kind.label(),
            document = document.text(),
            challenge = BOT_CHALLENGE_TEXT,
        );

        Self { system_message }
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// `[system, ...history, user]` in the order the chat client receives them.
    pub fn render(&self, history: &[Message], input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::new(Role::System, self.system_message.clone()));
        messages.extend(history.iter().cloned());
        messages.push(Message::new(Role::User, input.to_string()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_challenge_placeholder() {
        assert!(is_bot_challenge(BOT_CHALLENGE_TEXT));
        assert!(is_bot_challenge("Just a moment…\nEnable JavaScript and cookies to continue"));
        assert!(!is_bot_challenge("Wait just a moment, the quarterly numbers are in."));
    }
}
