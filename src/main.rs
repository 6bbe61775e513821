//! reset-watch
//!
//! Requests a password reset and waits for the email to be confirmed.
//!
//! ```text
//!   email ──▶ validate ──▶ submit ──▶ ┌──────────── session ────────────┐
//!                                     │ countdown 60..0    poller ≤ 25  │
//!                                     │      │                │         │
//!                                     │      ▼                ▼         │
//!                                     │  resend gate     confirmed /    │
//!                                     │  (Enter)         timed out      │
//!                                     └─────────────────────────────────┘
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use reset_watch::collaborators::{
    Destination, EmailStore, FileEmailStore, Navigator, Notice, NoticeCategory, Notifier,
};
use reset_watch::config::{load_config, validation::validate_config, ConfigError, ResetConfig};
use reset_watch::observability::logging;
use reset_watch::{HttpResetService, ResetController};

#[derive(Parser)]
#[command(name = "reset-watch")]
#[command(about = "Request a password reset and wait for email confirmation", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the reset service base URL.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a reset and wait for the email to be confirmed
    Request {
        /// Account email address
        email: String,
    },
    /// Print the last email a reset was requested for
    Last,
}

/// Notices and navigation from the controller, in order.
#[derive(Debug)]
enum Event {
    Notice(Notice),
    Navigate(Destination),
}

/// Routes controller callbacks onto the main loop.
struct CliEvents {
    tx: mpsc::UnboundedSender<Event>,
}

impl Notifier for CliEvents {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(Event::Notice(notice));
    }
}

impl Navigator for CliEvents {
    fn email_confirmed(&self) {
        let _ = self.tx.send(Event::Navigate(Destination::EmailConfirmed));
    }

    fn back_to_login(&self) {
        let _ = self.tx.send(Event::Navigate(Destination::Login));
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ResetConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability.log_level);

    let store = Arc::new(FileEmailStore::new(&config.storage.last_email_path));

    match cli.command {
        Commands::Last => {
            match store.last_email()? {
                Some(email) => println!("{}", email),
                None => eprintln!("No reset has been requested yet"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Request { email } => run_request(config, store, &email).await,
    }
}

async fn run_request(
    config: ResetConfig,
    store: Arc<FileEmailStore>,
    email: &str,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let service = Arc::new(HttpResetService::new(&config.service)?);
    let (tx, mut events) = mpsc::unbounded_channel();
    let cli_events = Arc::new(CliEvents { tx });

    let controller = ResetController::new(
        config,
        service,
        cli_events.clone(),
        cli_events,
        store,
    );

    let submitted = controller.submit(email).await;
    if let Some(code) = drain_events(&mut events) {
        return Ok(code);
    }
    if submitted.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    let mut countdown = controller.countdown();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if let Some(code) = handle_event(event) {
                    return Ok(code);
                }
            }
            Ok(()) = countdown.changed() => {
                let state = *countdown.borrow_and_update();
                if state.running {
                    eprint!("\rWaiting for confirmation... ({}s) ", state.seconds_remaining);
                    let _ = std::io::stderr().flush();
                } else if state.is_exhausted() {
                    eprintln!("\rPress Enter to resend the email, or q + Enter to go back.");
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().eq_ignore_ascii_case("q") => {
                    controller.back_to_login();
                }
                Ok(Some(_)) => match controller.resend().await {
                    Ok(Some(_)) => {}
                    Ok(None) => eprintln!("Resend is not available yet."),
                    Err(_) => {
                        return Ok(drain_events(&mut events).unwrap_or(ExitCode::FAILURE));
                    }
                },
                Ok(None) | Err(_) => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => {
                controller.cancel();
                eprintln!();
                return Ok(ExitCode::from(130));
            }
        }
    }
}

/// Show one event; `Some` means the flow is over.
fn handle_event(event: Event) -> Option<ExitCode> {
    match event {
        Event::Notice(notice) => {
            print_notice(&notice);
            (notice.category == NoticeCategory::Timeout).then_some(ExitCode::FAILURE)
        }
        Event::Navigate(Destination::EmailConfirmed) => {
            println!("Email confirmed. Continue in the app to choose a new password.");
            Some(ExitCode::SUCCESS)
        }
        Event::Navigate(Destination::Login) => Some(ExitCode::SUCCESS),
    }
}

/// Handle every queued event, returning the first exit code any of them
/// asks for.
fn drain_events(events: &mut mpsc::UnboundedReceiver<Event>) -> Option<ExitCode> {
    let mut exit = None;
    while let Ok(event) = events.try_recv() {
        let code = handle_event(event);
        exit = exit.or(code);
    }
    exit
}

fn print_notice(notice: &Notice) {
    match notice.category {
        NoticeCategory::Info => eprintln!("\n{}: {}", notice.title, notice.message),
        _ => eprintln!("\n{} [{:?}]: {}", notice.title, notice.category, notice.message),
    }
}
