pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::document::SourceKind;
use crate::session::Conversation;
pub use dispatcher::create_command_registry;

/// Document and model chosen in the shell, applied on the next load
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub kind: Option<SourceKind>,
    pub source: Option<String>,
    pub provider: String,
    pub model: String,
}

pub struct ChatState {
    pub conversation: Conversation,
    pub selection: Selection,
    /// Set by `/load`; the app performs the (async) initialization
    pub load_requested: bool,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(conversation: Conversation, selection: Selection) -> Self {
        Self {
            conversation,
            selection,
            load_requested: false,
            should_continue: true,
        }
    }
}
