use crate::providers::{Message, ProviderRegistry, Role};
use crate::session::Session;
use console::style;
use std::io::{self, Write};

fn rule_width() -> usize {
    let term = console::Term::stdout();
    let terminal_width = term.size().1 as usize;
    std::cmp::min(terminal_width.saturating_sub(4), 100).max(40)
}

/// Announce a freshly initialized session
pub fn display_session_ready(session: &Session) {
    let width = rule_width();
    println!("\n{}", style("─".repeat(width)).dim().blue());
    println!(
        "{} {} {}",
        style("🎲 Gauss is ready").bold().magenta(),
        style(format!("[{} document]", session.kind())).cyan(),
        style(format!("{} · {}", session.provider_name(), session.model())).dim()
    );
    println!("{}", style("─".repeat(width)).dim().blue());
}

pub fn display_status(session: Option<&Session>, history_len: usize) {
    match session {
        Some(session) => println!(
            "{} {} document · {} · {} · {} messages",
            style("●").green(),
            session.kind(),
            session.provider_name(),
            session.model(),
            history_len
        ),
        None => println!("{} no document loaded", style("●").red()),
    }
}

/// Write one reply fragment as soon as it arrives
pub fn display_fragment(fragment: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(fragment.as_bytes())?;
    stdout.flush()
}

pub fn finish_reply(reply: &str) {
    if !reply.ends_with('\n') {
        println!();
    }
}

pub fn display_assistant_prefix() {
    print!("{} ", style("Gauss ›").bold().blue());
    io::stdout().flush().ok();
}

pub fn display_guidance(message: &str) {
    println!("{} {}", style("ℹ").bold().yellow(), style(message).yellow());
}

pub fn display_error(error: &dyn std::fmt::Display) {
    eprintln!("{} {}", style("✖").bold().red(), style(error).red());
}

pub fn display_models(registry: &ProviderRegistry) {
    println!("{}", style("Available models").bold().underlined());
    for spec in registry.providers() {
        println!("{}", style(&spec.name).bold().cyan());
        for model in &spec.models {
            println!("  {}", model);
        }
    }
}

/// Render the conversation transcript as markdown
pub fn display_history(history: &[Message]) {
    if history.is_empty() {
        display_guidance("The conversation is empty.");
        return;
    }

    let mut markdown = String::new();
    for message in history {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "Gauss",
            Role::System => "System",
        };
        markdown.push_str(&format!("**{}:**\n\n{}\n\n---\n\n", speaker, message.content));
    }
    termimad::print_text(&markdown);
}
