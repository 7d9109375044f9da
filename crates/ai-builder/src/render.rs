//! Terminal rendering of session state.

use std::fmt::Write as _;

use ai_builder_core::artifacts::ArtifactStore;
use ai_builder_core::directory::ChatDirectory;
use ai_builder_core::{ChatTransition, IntentKind, SendReport, SessionSnapshot};
use ai_builder_model::{ChatId, Facet, Message, Role};
use owo_colors::OwoColorize;

/// The bar drawn in front of every transcript line.
pub const BAR_CHAR: &str = "▎";

/// Renders a transcript message.
///
/// A user message shows its prompt; an assistant message shows every facet
/// it carries.
pub fn message(msg: &Message) -> String {
    let mut out = String::new();
    match msg.role {
        Role::User => {
            let prompt = msg.prompt.as_deref().unwrap_or_default();
            _ = writeln!(
                out,
                "{}🧑 {}",
                BAR_CHAR.bright_green(),
                prompt.bright_white()
            );
        }
        Role::Assistant => {
            let bar = BAR_CHAR.bright_cyan();
            for facet in msg.facets() {
                match facet {
                    Facet::Text(text) => {
                        _ = writeln!(out, "{bar}🤖 {}", text.bright_white());
                    }
                    Facet::Code(code) => {
                        for line in code.lines() {
                            _ = writeln!(out, "{bar}   {}", line.yellow());
                        }
                    }
                    Facet::Explanation(text) => {
                        let prefix = "Explanation: ".bold();
                        _ = writeln!(out, "{bar}{prefix}{text}");
                    }
                    Facet::Summary(text) => {
                        _ = writeln!(out, "{bar}{}{text}", "Summary: ".bold());
                    }
                }
            }
        }
    }
    out
}

/// Renders a whole transcript.
pub fn transcript(messages: &[Message]) -> String {
    if messages.is_empty() {
        return format!("{}\n", "(no messages yet)".dimmed());
    }
    messages.iter().map(message).collect()
}

/// Renders the numbered chat list, marking the active chat.
pub fn chats(directory: &ChatDirectory, active: Option<&ChatId>) -> String {
    if directory.is_empty() {
        return format!("{}\n", "(no chats yet)".dimmed());
    }
    let mut out = String::new();
    for (n, chat) in directory.chats().iter().enumerate() {
        let marker = if Some(&chat.id) == active { "*" } else { " " };
        let title = if chat.title.is_empty() {
            "(untitled)"
        } else {
            chat.title.as_str()
        };
        _ = writeln!(
            out,
            "{marker}{:>3}. {} {}",
            n + 1,
            title.bright_white(),
            chat.id.dimmed()
        );
    }
    out
}

/// Renders the generated file list, marking the selected file.
pub fn files(artifacts: &ArtifactStore) -> String {
    if artifacts.paths().is_empty() {
        return format!("{}\n", "(no generated files)".dimmed());
    }
    let mut out = String::new();
    for path in artifacts.paths() {
        if Some(path.as_str()) == artifacts.selected() {
            _ = writeln!(out, "* {}", path.bright_white().bold());
        } else {
            _ = writeln!(out, "  {path}");
        }
    }
    out
}

/// Renders a generated file with a header line.
pub fn file(path: &str, content: &str) -> String {
    let mut out = format!("{}\n", format!("── {path}").bright_magenta());
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Renders the result of a completed send.
pub fn report(report: &SendReport, snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    if let ChatTransition::Adopt(id) = &report.transition {
        _ = writeln!(out, "{}", format!("(now in chat {id})").dimmed());
    }
    match report.intent {
        IntentKind::GenerateProject => {
            let artifacts = &snapshot.artifacts;
            _ = writeln!(
                out,
                "{}🤖 Generated {} file(s):",
                BAR_CHAR.bright_cyan(),
                artifacts.paths().len()
            );
            out.push_str(&files(artifacts));
            if let Some(path) = artifacts.selected() {
                out.push_str(&file(path, artifacts.selected_content()));
            }
        }
        IntentKind::ModifyFiles | IntentKind::Answer => {
            _ = writeln!(
                out,
                "{}🤖 {}",
                BAR_CHAR.bright_cyan(),
                snapshot.output.bright_white()
            );
        }
    }
    out
}
