//! An interactive terminal client for the AI builder service.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use ai_builder::commands::{self, Command};
use ai_builder::core::{SendOutcome, Session, SessionBuilder};
use ai_builder::{attach, render};
use ai_builder_http::{HttpBackend, HttpConfigBuilder};
use ai_builder_model::{Credential, MAX_ATTACHMENTS, Provider};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::select;
use tokio::time::sleep;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(token) = env::var("AI_BUILDER_TOKEN") else {
        eprintln!("AI_BUILDER_TOKEN environment variable is not set");
        return;
    };
    let provider = match env::var("AI_BUILDER_PROVIDER") {
        Ok(name) => match name.parse::<Provider>() {
            Ok(provider) => provider,
            Err(err) => {
                eprintln!("AI_BUILDER_PROVIDER: {err}");
                return;
            }
        },
        Err(_) => Provider::default(),
    };

    let mut config = HttpConfigBuilder::new();
    if let Ok(base_url) = env::var("AI_BUILDER_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    let config = config.build();
    info!("using backend at {}", config.base_url());

    let backend = HttpBackend::new(config);
    let session =
        SessionBuilder::with_backend(backend, Credential::bearer(token))
            .with_provider(provider)
            .build();

    session.load_chats().await;
    let snapshot = session.snapshot();
    print!("{}", render::chats(&snapshot.directory, None));
    println!("{}", "Type /help for the list of commands.".dimmed());

    let mut input = BufReader::new(io::stdin()).lines();
    loop {
        prompt(&session);
        let Some(line) = read_line(&mut input).await else {
            break;
        };
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{}", err.red());
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        run(&session, command).await;
    }
}

fn prompt(session: &Session) {
    let snapshot = session.snapshot();
    let mut tags = vec![snapshot.provider.to_string()];
    if snapshot.edit_mode {
        tags.push(format!("edit, {} file(s)", snapshot.attachments.len()));
    }
    print!("{} > ", format!("[{}]", tags.join(" | ")).dimmed());
    std::io::stdout().flush().ok();
}

async fn run(session: &Session, command: Command) {
    match command {
        Command::Send(prompt) => {
            session.set_prompt(prompt);
            send(session).await;
        }
        Command::New => match session.new_chat().await {
            Ok(id) => println!("{}", format!("(now in chat {id})").dimmed()),
            Err(err) => eprintln!("{}", err.user_message().red()),
        },
        Command::Chats => {
            session.load_chats().await;
            let snapshot = session.snapshot();
            let active = snapshot.conversation.chat_id();
            print!("{}", render::chats(&snapshot.directory, active));
        }
        Command::Open(arg) => {
            let directory = session.snapshot().directory;
            session.open_chat(commands::resolve_chat(&arg, &directory)).await;
            let snapshot = session.snapshot();
            print!("{}", render::transcript(snapshot.conversation.messages()));
        }
        Command::Files => {
            print!("{}", render::files(&session.snapshot().artifacts));
        }
        Command::View(path) => {
            if session.select_file(&path) {
                let snapshot = session.snapshot();
                print!(
                    "{}",
                    render::file(&path, snapshot.artifacts.selected_content())
                );
            } else {
                let message = format!("no generated file named {path}");
                eprintln!("{}", message.red());
            }
        }
        Command::Provider(provider) => session.set_provider(provider),
        Command::Edit(edit_mode) => session.set_edit_mode(edit_mode),
        Command::Attach(pattern) => match attach::collect(&pattern).await {
            Ok(attachments) => {
                for attachment in attachments {
                    println!("{}", format!("+ {}", attachment.name).dimmed());
                    session.attach(attachment);
                }
                let count = session.snapshot().attachments.len();
                if count > MAX_ATTACHMENTS {
                    let message = format!(
                        "only the first {MAX_ATTACHMENTS} of {count} files \
                         will be sent"
                    );
                    println!("{}", message.yellow());
                }
            }
            Err(err) => eprintln!("{}", err.red()),
        },
        Command::Detach => session.clear_attachments(),
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
}

async fn send(session: &Session) {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style);
    progress_bar.set_message("🤔 Generating...");

    let send = session.send();
    tokio::pin!(send);
    let result = loop {
        select! {
            result = &mut send => break result,
            _ = sleep(Duration::from_millis(100)) => progress_bar.inc(1),
        }
    };
    progress_bar.finish_and_clear();

    match result {
        Ok(SendOutcome::Completed(report)) => {
            print!("{}", render::report(&report, &session.snapshot()));
        }
        Ok(SendOutcome::Skipped) => {}
        Err(err) => eprintln!("{}", err.user_message().red()),
    }
}

async fn read_line(input: &mut Input) -> Option<String> {
    match input.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
