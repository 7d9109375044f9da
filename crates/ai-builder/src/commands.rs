//! Parsing of REPL input lines.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use ai_builder_core::directory::ChatDirectory;
use ai_builder_model::{ChatId, Provider, UnknownProvider};

/// Usage text printed by `/help`.
pub const HELP: &str = "\
Type a prompt and press enter to send it. Commands:
  /new               start a new chat titled after the pending prompt
  /chats             list your chats
  /open <n|id>       open a chat by list number or id
  /files             list the generated files
  /view <path>       show a generated file
  /provider <name>   auto, mock, openai, gemini or claude
  /edit on|off       send attachments with the prompt
  /attach <glob>     add local files to the upload batch
  /detach            empty the upload batch
  /help              show this message
  /quit              exit";

/// A parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send the line as the prompt.
    Send(String),
    /// `/new`
    New,
    /// `/chats`
    Chats,
    /// `/open <n|id>`
    Open(String),
    /// `/files`
    Files,
    /// `/view <path>`
    View(String),
    /// `/provider <name>`
    Provider(Provider),
    /// `/edit on|off`
    Edit(bool),
    /// `/attach <glob>`
    Attach(String),
    /// `/detach`
    Detach,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
}

/// Error returned for malformed commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The command name is not recognized.
    UnknownCommand(String),
    /// The command needs an argument that was not given.
    MissingArgument(&'static str),
    /// `/edit` got something other than `on` or `off`.
    InvalidToggle(String),
    /// `/provider` got an unknown provider name.
    Provider(UnknownProvider),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand(name) => {
                write!(f, "unknown command: /{name} (try /help)")
            }
            ParseError::MissingArgument(usage) => write!(f, "usage: {usage}"),
            ParseError::InvalidToggle(value) => {
                write!(f, "expected `on` or `off`, got {value:?}")
            }
            ParseError::Provider(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<UnknownProvider> for ParseError {
    #[inline]
    fn from(err: UnknownProvider) -> Self {
        ParseError::Provider(err)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Send(line.to_owned()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let required = |usage: &'static str| {
            if arg.is_empty() {
                Err(ParseError::MissingArgument(usage))
            } else {
                Ok(arg.to_owned())
            }
        };

        let command = match name {
            "new" => Command::New,
            "chats" => Command::Chats,
            "open" => Command::Open(required("/open <n|id>")?),
            "files" => Command::Files,
            "view" => Command::View(required("/view <path>")?),
            "provider" => {
                Command::Provider(required("/provider <name>")?.parse()?)
            }
            "edit" => match arg {
                "on" => Command::Edit(true),
                "off" => Command::Edit(false),
                "" => return Err(ParseError::MissingArgument("/edit on|off")),
                other => {
                    return Err(ParseError::InvalidToggle(other.to_owned()));
                }
            },
            "attach" => Command::Attach(required("/attach <glob>")?),
            "detach" => Command::Detach,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_owned())),
        };
        Ok(command)
    }
}

/// Resolves the argument of `/open`.
///
/// A number selects a chat by its 1-based position in the listing; anything
/// else is taken as a chat id.
pub fn resolve_chat(arg: &str, directory: &ChatDirectory) -> ChatId {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| directory.chats().get(index))
        .map_or_else(|| ChatId::new(arg), |chat| chat.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        line.parse()
    }

    #[test]
    fn test_plain_lines_are_prompts() {
        assert_eq!(
            parse("  build a landing page \n"),
            Ok(Command::Send("build a landing page".to_owned()))
        );
        assert_eq!(parse(""), Ok(Command::Send(String::new())));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("/new"), Ok(Command::New));
        assert_eq!(parse("/open  2 "), Ok(Command::Open("2".to_owned())));
        assert_eq!(
            parse("/view src/app.js"),
            Ok(Command::View("src/app.js".to_owned()))
        );
        assert_eq!(
            parse("/provider Gemini"),
            Ok(Command::Provider(Provider::Gemini))
        );
        assert_eq!(parse("/edit off"), Ok(Command::Edit(false)));
        assert_eq!(
            parse("/attach src/*.js"),
            Ok(Command::Attach("src/*.js".to_owned()))
        );
        assert_eq!(parse("/exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_malformed_commands() {
        assert_eq!(
            parse("/open"),
            Err(ParseError::MissingArgument("/open <n|id>"))
        );
        assert_eq!(
            parse("/edit maybe"),
            Err(ParseError::InvalidToggle("maybe".to_owned()))
        );
        assert!(matches!(
            parse("/provider llama"),
            Err(ParseError::Provider(_))
        ));
        assert_eq!(
            parse("/deploy").unwrap_err().to_string(),
            "unknown command: /deploy (try /help)"
        );
    }

    #[tokio::test]
    async fn test_resolve_chat() {
        use ai_builder_core::SessionBuilder;
        use ai_builder_model::Credential;
        use ai_builder_test_backend::TestBackend;

        let backend = TestBackend::default();
        backend.add_chat("c1", "Landing", vec![]);
        backend.add_chat("c2", "Blog", vec![]);
        let session =
            SessionBuilder::with_backend(backend, Credential::bearer("t"))
                .build();
        session.load_chats().await;
        let directory = session.snapshot().directory;

        assert_eq!(resolve_chat("2", &directory), ChatId::new("c2"));
        assert_eq!(resolve_chat("c1", &directory), ChatId::new("c1"));
        assert_eq!(resolve_chat("0", &directory), ChatId::new("0"));
        assert_eq!(resolve_chat("3", &directory), ChatId::new("3"));
    }
}
