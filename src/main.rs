use musiclink::adapters::{FileTokenStore, LoopbackBrowserService, PendingPrompt, PromptAuthorizationSurface};
use musiclink::auth::{AuthClient, USER_CANCELLED_CODE};
use musiclink::config::ClientConfig;
use musiclink::connection::ConnectionManager;
use musiclink::logging::init_file_logging;
use musiclink::navigation::{NavDestination, Router};
use musiclink::session::{Session, SessionEvent};

use color_eyre::Result;
use serde_json::json;
use std::ops::ControlFlow;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = "\
Commands:
  show | hide            client became visible / hidden
  browse [id] | now | queue | settings
  back | panel           back gesture / toggle side panel
  login | cancel | logout
  token <t> | deny <CODE> [description] | dismiss | raw <text>
  fail | suspend         make the next connect fail / suspend the connection
  status | help | quit";

/// What a line of input asks for.
enum Command {
    Event(SessionEvent),
    Deliver(Option<String>),
    FailNextConnect,
    Suspend,
    Status,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "show" => Command::Event(SessionEvent::BecameVisible),
        "hide" => Command::Event(SessionEvent::BecameHidden),
        "browse" if rest.is_empty() => {
            Command::Event(SessionEvent::Navigate(NavDestination::browse_root()))
        }
        "browse" => Command::Event(SessionEvent::Navigate(NavDestination::browse(rest, None))),
        "now" => Command::Event(SessionEvent::SelectFromSidePanel(NavDestination::NowPlaying)),
        "queue" => Command::Event(SessionEvent::SelectFromSidePanel(NavDestination::UpNext)),
        "settings" => Command::Event(SessionEvent::SelectFromSidePanel(NavDestination::Settings)),
        "back" => Command::Event(SessionEvent::Back),
        "panel" => Command::Event(SessionEvent::ToggleSidePanel),
        "login" => Command::Event(SessionEvent::RequestAuthorization),
        "cancel" => Command::Event(SessionEvent::CancelAuthorization),
        "logout" => Command::Event(SessionEvent::SignOut),
        "token" => Command::Deliver(Some(json!({ "musicUserToken": rest }).to_string())),
        "deny" => {
            let (code, description) = match rest.split_once(char::is_whitespace) {
                Some((code, description)) => (code, Some(description.trim())),
                None => (rest, None),
            };
            let payload = match description {
                Some(description) => json!({ "error": code, "errorDescription": description }),
                None => json!({ "error": code }),
            };
            Command::Deliver(Some(payload.to_string()))
        }
        "dismiss" => Command::Deliver(Some(json!({ "error": USER_CANCELLED_CODE }).to_string())),
        "raw" if rest.is_empty() => Command::Deliver(None),
        "raw" => Command::Deliver(Some(rest.to_string())),
        "fail" => Command::FailNextConnect,
        "suspend" => Command::Suspend,
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Event(SessionEvent::Shutdown),
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

type LinkSession = Session<LoopbackBrowserService, PromptAuthorizationSurface, FileTokenStore>;

/// Turn a command into at most one session event.
fn resolve(
    command: Command,
    session: &LinkSession,
    pending: &PendingPrompt,
) -> Option<SessionEvent> {
    match command {
        Command::Event(event) => Some(event),
        Command::Deliver(payload) => match pending.take() {
            Some(attempt) => Some(SessionEvent::AuthorizationDelivered { attempt, payload }),
            None => {
                println!("No authorization prompt is open. Use `login` first.");
                None
            }
        },
        Command::FailNextConnect => {
            session.connection().browser().fail_next_connect();
            println!("The next connect will fail.");
            None
        }
        Command::Suspend => {
            match session.connection().current_cycle() {
                Some(cycle) => session.connection().browser().suspend(cycle),
                None => println!("Not connected."),
            }
            None
        }
        Command::Status => None,
        Command::Help => {
            println!("{}", HELP);
            None
        }
        Command::Unknown(word) => {
            println!("Unknown command '{}'. Type `help`.", word);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("musiclink {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;

    let config = ClientConfig::load()?;
    let data_dir = config.data_dir()?;
    if let Err(e) = init_file_logging(&config.log_path()?) {
        eprintln!("Warning: logging disabled: {}", e.user_message());
    }
    info!("musiclink {} starting, data dir {}", VERSION, data_dir.display());
    if let Err(e) = config.validate() {
        warn!(code = e.error_code(), "{}", e);
        eprintln!("Warning: {}", e.user_message());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();

    let browser = LoopbackBrowserService::new(tx.clone()).with_delay(config.connect_delay());
    let surface = PromptAuthorizationSurface::new();
    let pending = surface.pending();
    let store = FileTokenStore::in_dir(&data_dir);

    let connection = ConnectionManager::new(browser, config.service.clone());
    let auth = AuthClient::new(surface, store, config.developer_token.clone())
        .with_defaults(config.request_defaults());
    let mut session = Session::new(connection, auth, Router::new());

    session.start().await;
    println!("musiclink {} - type `help` for commands.", VERSION);
    println!("{}", session.status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        let event = tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match parse_command(&line) {
                        Some(command) => resolve(command, &session, &pending),
                        None => continue,
                    },
                    None => {
                        stdin_open = false;
                        Some(SessionEvent::Shutdown)
                    }
                }
            }
            event = rx.recv() => event,
        };

        let Some(event) = event else {
            println!("{}", session.status());
            continue;
        };

        match session.handle(event).await {
            Ok(ControlFlow::Break(())) => break,
            Ok(ControlFlow::Continue(())) => {}
            Err(e) => {
                warn!(code = e.error_code(), "{}", e);
                println!("{}", e.user_message());
            }
        }
        println!("{}", session.status());
    }

    session.connection_mut().disconnect();
    info!("musiclink stopped");
    Ok(())
}
