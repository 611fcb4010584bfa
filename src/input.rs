use crate::commands::dispatcher::CommandDispatcher;
use crate::config::Config;
use crate::core::error::GaussError;

use console::style;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use std::borrow::Cow;

/// Completes command names after `/` and file paths everywhere else
pub struct ChatCompleter {
    filename_completer: FilenameCompleter,
    command_registry: CommandDispatcher,
}

impl ChatCompleter {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
            command_registry,
        }
    }
}

impl Completer for ChatCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let command_part = line[..pos]
            .strip_prefix('/')
            .filter(|prefix| !prefix.contains(' '));
        if let Some(command_part) = command_part {
            let matches: Vec<Pair> = self
                .command_registry
                .get_command_names()
                .into_iter()
                .filter(|cmd| cmd.starts_with(command_part))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd,
                })
                .collect();

            if !matches.is_empty() {
                return Ok((1, matches));
            }
        }

        self.filename_completer.complete(line, pos, ctx)
    }
}

pub struct ChatHelper {
    completer: ChatCompleter,
    hinter: HistoryHinter,
}

impl ChatHelper {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self {
            completer: ChatCompleter::new(command_registry),
            hinter: HistoryHinter::new(),
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for ChatHelper {}

/// Creates a configured rustyline editor
pub fn create_editor(
    command_registry: CommandDispatcher,
) -> Result<Editor<ChatHelper, FileHistory>, GaussError> {
    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| GaussError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(command_registry)));

    let _ = editor.load_history(&Config::input_history_path());

    Ok(editor)
}

/// Reads a line of input; `None` means the user wants to leave
pub fn read_input(
    editor: &mut Editor<ChatHelper, FileHistory>,
) -> Result<Option<String>, GaussError> {
    let prompt = if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        "you › ".to_string()
    } else {
        style("you › ").bold().cyan().to_string()
    };
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor.add_history_entry(line.as_str())?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut Editor<ChatHelper, FileHistory>) -> Result<(), GaussError> {
    let history_path = Config::input_history_path();

    if let Some(parent) = history_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    editor
        .save_history(&history_path)
        .map_err(|e| GaussError::Input(format!("Failed to save history: {}", e)))
}
