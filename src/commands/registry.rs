use crate::commands::handler::CommandHandler;
use crate::core::error::GaussError;
use std::collections::HashMap;
use std::sync::Arc;

pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: CommandHandler + 'static>(&mut self, name: &str, command: C) {
        self.handlers.insert(name.to_string(), Arc::new(command));
    }

    pub fn execute(
        &self,
        name: &str,
        args: &str,
        state: &mut super::ChatState,
    ) -> Result<Option<String>, GaussError> {
        self.handlers
            .get(name)
            .ok_or_else(|| GaussError::Input(format!("Unknown command: /{} (try /help)", name)))
            .and_then(|handler| handler.execute(state, args))
    }

    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
