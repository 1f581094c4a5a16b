//! screentime - screen-time tracker with break reminders
//!
//! Counts how long the current user has been at the screen and, once the
//! threshold for their age bracket is reached, opens a break reminder
//! dialog in the terminal.
//!
//! # Usage
//!
//! ```text
//! screentime                         # track $USER, adult thresholds
//! screentime --dob 2012-06-01        # pick the bracket from a date of birth
//! screentime status [--json]         # print the stored session and exit
//! screentime logout                  # forget the stored session
//! ```
//!
//! Quitting with `q` keeps the session so the next start resumes it;
//! logging out with `x` ends it.

use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use screentime_core::{SessionClock, SessionView, UserProfile};
use screentime_tracker::{
    spawn_tracker, FileStore, MemoryStore, SessionStore, TrackerConfig, TrackerHandle,
    TrackerOptions,
};
use screentime_tui::input::{handle_key_event, Action, Event};
use screentime_tui::tasks::{spawn_keyboard_task, spawn_tracker_forwarder};
use screentime_tui::{ui, App, Result as TuiResult, TuiError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Arguments
// ============================================================================

/// screentime - screen-time tracker with age-based break reminders
#[derive(Parser, Debug)]
#[command(name = "screentime")]
#[command(about = "Track screen time and get reminded to take breaks")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// User whose session is tracked (defaults to $USER)
    #[arg(long, short = 'u', global = true)]
    user: Option<String>,

    /// Date of birth (YYYY-MM-DD); selects the age bracket
    #[arg(long, global = true)]
    dob: Option<String>,

    /// Config file (defaults to $SCREENTIME_CONFIG, then the user config dir)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Keep the session in memory only; nothing survives a restart
    #[arg(long)]
    ephemeral: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored session for the user and exit
    Status {
        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the stored session for the user
    Logout,
}

impl Args {
    fn user_id(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "default".to_string())
    }

    fn profile(&self) -> UserProfile {
        UserProfile::from_raw(self.user_id(), self.dob.as_deref())
    }
}

fn load_config(args: &Args) -> Result<TrackerConfig> {
    match &args.config {
        Some(path) => TrackerConfig::load_required(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => TrackerConfig::load_default().context("Failed to load config"),
    }
}

fn file_store(config: &TrackerConfig) -> Result<FileStore> {
    let dir = config
        .sessions_dir()
        .context("Could not determine a state directory; set state_dir in the config")?;
    Ok(FileStore::new(dir))
}

// ============================================================================
// Subcommands
// ============================================================================

/// Prints the persisted session without starting the tracker.
fn print_status(args: &Args, config: &TrackerConfig, json: bool) -> Result<()> {
    let profile = args.profile();
    let store = file_store(config)?;
    let policy = config.policy()?;
    let now = Utc::now();

    let clock = store
        .load(&profile.session_key())
        .with_context(|| format!("Failed to read session from {}", store.dir().display()))?
        .map(|state| SessionClock::rehydrate(state, now))
        .unwrap_or_default();
    let view = SessionView::project(&clock, &policy, Some(&profile), now);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("user:       {}", profile.user_id);
    if !view.active {
        println!("session:    not tracking");
        return Ok(());
    }
    println!("session:    {}", view.elapsed_display);
    println!(
        "threshold:  {} ({})",
        screentime_core::describe_duration(Duration::from_millis(view.threshold_ms)),
        view.bracket
    );
    println!(
        "reminder:   {}",
        if view.reminder_visible { "showing" } else { "hidden" }
    );
    Ok(())
}

fn forget_session(args: &Args, config: &TrackerConfig) -> Result<()> {
    let profile = args.profile();
    let store = file_store(config)?;
    store
        .remove(&profile.session_key())
        .context("Failed to remove stored session")?;
    println!("Logged out {}", profile.user_id);
    Ok(())
}

// ============================================================================
// Terminal Setup / Cleanup
// ============================================================================

/// Enters raw mode and the alternate screen.
fn setup_terminal() -> TuiResult<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(|e| TuiError::TerminalInit(e.to_string()))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| TuiError::TerminalInit(e.to_string()))?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| TuiError::TerminalInit(e.to_string()))
}

/// Restores the terminal. Always called before exiting, even on error.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> TuiResult<()> {
    disable_raw_mode().map_err(|e| TuiError::TerminalCleanup(e.to_string()))?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| TuiError::TerminalCleanup(e.to_string()))?;

    terminal
        .show_cursor()
        .map_err(|e| TuiError::TerminalCleanup(e.to_string()))?;

    Ok(())
}

// ============================================================================
// Main Event Loop
// ============================================================================

/// Forwards a user action to the tracker.
///
/// Returns `Ok(false)` once the loop should stop.
async fn dispatch(action: Action, app: &mut App, tracker: &TrackerHandle) -> TuiResult<bool> {
    match action {
        Action::None => {}
        Action::Quit => {
            info!("User requested quit");
            return Ok(false);
        }
        Action::Logout => {
            info!(user = %app.user_id, "User requested logout");
            tracker.logout().await?;
            return Ok(false);
        }
        Action::TakeBreak => {
            if !tracker.acknowledge_break().await? {
                debug!("Break ignored, no active session");
            }
        }
        Action::RemindLater => {
            if !tracker.defer_reminder().await? {
                debug!("Defer ignored, reminder not showing");
            }
        }
    }
    Ok(true)
}

/// Renders, waits up to one tick for an event, applies it; until quit.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
    tracker: &TrackerHandle,
    cancel_token: &CancellationToken,
) -> TuiResult<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        match tokio::time::timeout(tick_rate, event_rx.recv()).await {
            Ok(Some(Event::Key(key))) => {
                let action = handle_key_event(key, app);
                match dispatch(action, app, tracker).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        warn!(error = %e, "Tracker request failed");
                        app.mark_disconnected();
                    }
                }
            }
            Ok(Some(Event::Resize(_width, _height))) => {
                // ratatui picks up the new size on the next draw
                debug!("Terminal resized");
            }
            Ok(Some(Event::Tracker(event))) => app.apply_event(&event),
            Ok(Some(Event::TrackerClosed)) => {
                warn!("Tracker stopped");
                app.mark_disconnected();
            }
            Ok(None) => {
                warn!("Event channel closed");
                break;
            }
            // Timeout, redraw
            Err(_) => {}
        }

        if app.should_quit || cancel_token.is_cancelled() {
            break;
        }
    }

    Ok(())
}

// ============================================================================
// Logging Setup
// ============================================================================

/// `$XDG_STATE_HOME/screentime`, falling back to `$HOME/.local/state/screentime`.
fn get_log_dir() -> Option<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg_state).join("screentime"));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/state/screentime"))
}

/// Opens the log file in append mode, or `None` (logging disabled).
///
/// Warnings go to stderr before the TUI takes over the terminal.
fn create_log_file() -> Option<fs::File> {
    let log_dir = get_log_dir()?;

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory {log_dir:?}: {e}");
        return None;
    }

    let log_path = log_dir.join("screentime.log");
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {log_path:?}: {e}");
            None
        }
    }
}

/// Logs go to a file; stderr would corrupt the alternate screen.
fn init_logging() {
    let Some(file) = create_log_file() else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init();
        return;
    };

    let filter = EnvFilter::from_default_env().add_directive(
        "screentime=info"
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::Directive::from(tracing::Level::INFO)),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    match &args.command {
        Some(Command::Status { json }) => return print_status(&args, &config, *json),
        Some(Command::Logout) => return forget_session(&args, &config),
        None => {}
    }

    init_logging();

    let store: Arc<dyn SessionStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(file_store(&config)?)
    };
    let options = TrackerOptions::new(config.policy()?, store)
        .with_tick_interval(config.tick_interval());

    let profile = args.profile();
    info!(
        user = %profile.user_id,
        ephemeral = args.ephemeral,
        tick_ms = config.tick_interval_ms,
        "screentime starting"
    );

    let tracker = spawn_tracker(options);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let cancel_token = CancellationToken::new();

    // Subscribe before login so the Started event is not missed
    let events = tracker.subscribe().await?;
    let forwarder_handle = spawn_tracker_forwarder(events, event_tx.clone(), cancel_token.clone());
    let mut app = App::new(profile.user_id.clone());
    tracker.login(profile).await?;

    let mut terminal = match setup_terminal() {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to initialize terminal");
            let _ = tracker.shutdown().await;
            return Err(e.into());
        }
    };

    let keyboard_handle = spawn_keyboard_task(event_tx, cancel_token.clone());

    let result = run_event_loop(
        &mut terminal,
        &mut app,
        &mut event_rx,
        &tracker,
        &cancel_token,
    )
    .await;

    cancel_token.cancel();

    // Persists an active session so the next start resumes it
    if let Err(e) = tracker.shutdown().await {
        warn!(error = %e, "Tracker already stopped");
    }

    let _ = tokio::time::timeout(Duration::from_millis(100), forwarder_handle).await;
    let _ = tokio::time::timeout(Duration::from_millis(100), keyboard_handle).await;

    if let Err(e) = cleanup_terminal(&mut terminal) {
        error!(error = %e, "Failed to cleanup terminal");
    }

    info!("screentime stopped");
    result.context("TUI event loop failed")
}
