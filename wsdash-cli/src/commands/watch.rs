//! Watch command: stream readings from the selected endpoint.
//!
//! Runs the lifecycle manager on a current-thread runtime. Interactive
//! commands are read line by line from stdin while the session runs.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info};
use wsdash_core::config::AppSettings;
use wsdash_core::connection::{ConnectionState, LifecycleManager, ReconnectPolicy};
use wsdash_core::dashboard::{Dashboard, SessionEvent, SessionStats, session_callbacks};
use wsdash_core::export::{ExportError, ExportFormat};
use wsdash_core::readings::{LogEntry, ReadingLog};
use wsdash_core::tracing::span_names;
use wsdash_core::transport::WebSocketTransport;

use crate::cli::WatchArgs;
use crate::commands::list::format_table;
use crate::error::CliError;
use crate::util::{create_config_manager, load_endpoints};

/// How long to wait for the close handshake on exit
const CLOSE_GRACE: Duration = Duration::from_secs(1);

const HELP: &str = "\
Commands:
  connect                 connect to the selected endpoint
  disconnect              close the connection (no reconnect)
  toggle                  connect or disconnect
  select <endpoint>       select another endpoint
  filter [text]           show only matching entries (no text clears)
  clear                   clear the log
  export <json|csv> [path]
  status                  show connection status
  list                    list endpoints
  help                    show this help
  quit                    stop watching";

/// One line typed while watching
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchCommand {
    Connect,
    Disconnect,
    Toggle,
    Select(String),
    Filter(Option<String>),
    Clear,
    Export(ExportFormat, Option<PathBuf>),
    Status,
    List,
    Help,
    Quit,
}

impl FromStr for WatchCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_ascii_lowercase().as_str() {
            "connect" => Ok(Self::Connect),
            "disconnect" => Ok(Self::Disconnect),
            "toggle" => Ok(Self::Toggle),
            "select" if !rest.is_empty() => Ok(Self::Select(rest.to_string())),
            "select" => Err("usage: select <endpoint>".to_string()),
            "filter" => Ok(Self::Filter((!rest.is_empty()).then(|| rest.to_string()))),
            "clear" => Ok(Self::Clear),
            "export" => {
                let (format, path) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(f, p)| (f, p.trim()));
                let format = format
                    .parse::<ExportFormat>()
                    .map_err(|e| e.to_string())?;
                let path = (!path.is_empty()).then(|| PathBuf::from(path));
                Ok(Self::Export(format, path))
            }
            "status" => Ok(Self::Status),
            "list" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

/// Why the watch loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Quit,
    Interrupted,
    CountReached,
    Closed { ever_opened: bool },
}

/// Watch command handler
pub fn cmd_watch(config_path: Option<&Path>, args: WatchArgs) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(
        run_watch(config_path, args).instrument(tracing::info_span!(span_names::SESSION_WATCH)),
    );
    // the stdin reader blocks in a thread that cannot be cancelled
    runtime.shutdown_background();
    result
}

/// Reconnect policy for a watch session from settings and flags
fn watch_policy(settings: &AppSettings, args: &WatchArgs) -> ReconnectPolicy {
    let mut policy = settings.reconnect.clone();
    if let Some(delay_ms) = args.retry_delay_ms {
        policy = policy.with_delay_ms(delay_ms);
    }
    if args.no_reconnect {
        policy = policy.with_enabled(false);
    }
    policy
}

struct Session {
    dashboard: Dashboard,
    manager: LifecycleManager<WebSocketTransport>,
    filter: Option<String>,
    readings: u64,
    ever_opened: bool,
}

impl Session {
    fn print_entry(&self, entry: &LogEntry) {
        if self.filter.as_deref().is_none_or(|f| entry.matches(f)) {
            println!("{entry}");
        }
    }

    fn print_latest(&self) {
        if let Some(entry) = self.dashboard.log().latest() {
            self.print_entry(entry);
        }
    }

    /// Applies a callback event; returns true when it was a reading
    fn on_event(&mut self, event: SessionEvent) -> bool {
        let is_reading = matches!(event, SessionEvent::Reading(_));
        if matches!(event, SessionEvent::Opened) {
            self.ever_opened = true;
        }
        let entry = self.dashboard.apply(event).clone();
        self.print_entry(&entry);
        if is_reading {
            self.readings += 1;
        }
        is_reading
    }

    fn status_line(&self) -> String {
        let stats = self.dashboard.stats();
        let endpoint = self
            .dashboard
            .endpoints()
            .active()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        let mut line = format!(
            "{} | endpoint: {endpoint} | state: {} | readings: {} | errors: {}",
            self.dashboard.status(),
            self.manager.current_state(),
            stats.readings,
            stats.errors
        );
        if stats.connected_since.is_some() {
            line.push_str(&format!(
                " | up {}",
                SessionStats::format_duration(stats.uptime_seconds())
            ));
        }
        if self.manager.retry_pending() {
            line.push_str(&format!(
                " | reconnect attempt {} pending",
                self.manager.retry_attempt() + 1
            ));
        }
        line
    }

    fn export(&self, format: ExportFormat, path: Option<&Path>) -> Result<PathBuf, CliError> {
        let path = path.unwrap_or_else(|| Path::new("."));
        Ok(self.dashboard.export_to(format, path)?)
    }

    /// Runs one interactive command; returns false to stop watching
    fn run_command(&mut self, command: WatchCommand) -> Result<bool, CliError> {
        debug!(?command, "Watch command");
        match command {
            WatchCommand::Connect => self.dashboard.connect_active(&mut self.manager)?,
            WatchCommand::Disconnect => {
                if self.dashboard.disconnect(&mut self.manager) {
                    self.print_latest();
                }
            }
            WatchCommand::Toggle => {
                let was_open = self.manager.current_state() == ConnectionState::Open;
                self.dashboard.toggle(&mut self.manager)?;
                if was_open {
                    self.print_latest();
                }
            }
            WatchCommand::Select(target) => {
                let index = self.dashboard.endpoints().find(&target)?;
                if self.dashboard.select(index, &mut self.manager)? {
                    self.print_latest();
                } else {
                    println!("Already selected.");
                }
            }
            WatchCommand::Filter(filter) => {
                self.filter = filter;
                let entries: Vec<&LogEntry> = self.dashboard.log().entries().collect();
                for entry in entries.into_iter().rev() {
                    self.print_entry(entry);
                }
            }
            WatchCommand::Clear => {
                self.dashboard.clear_log();
                self.print_latest();
            }
            WatchCommand::Export(format, path) => {
                let written = self.export(format, path.as_deref())?;
                println!("Exported readings to {}", written.display());
            }
            WatchCommand::Status => println!("{}", self.status_line()),
            WatchCommand::List => println!("{}", format_table(self.dashboard.endpoints())),
            WatchCommand::Help => println!("{HELP}"),
            WatchCommand::Quit => return Ok(false),
        }
        Ok(true)
    }
}

async fn run_watch(config_path: Option<&Path>, args: WatchArgs) -> Result<(), CliError> {
    let settings = create_config_manager(config_path)?.load_settings()?;
    let mut endpoints = load_endpoints(config_path)?;
    if let Some(target) = &args.target {
        let index = endpoints.find(target)?;
        endpoints.select(index)?;
    }

    let max_entries = args.max_entries.unwrap_or(settings.log.max_entries);
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let mut manager =
        LifecycleManager::with_policy(WebSocketTransport::new(), watch_policy(&settings, &args));
    manager.configure(session_callbacks(events_tx));

    let mut session = Session {
        dashboard: Dashboard::new(endpoints, ReadingLog::new(max_entries)),
        manager,
        filter: args.filter.clone(),
        readings: 0,
        ever_opened: false,
    };

    session.dashboard.connect_active(&mut session.manager)?;
    if let Some(endpoint) = session.dashboard.endpoints().active() {
        println!("Connecting to {endpoint}...");
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let reason = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break StopReason::Interrupted,
            Some(event) = events.recv() => {
                let closed = matches!(event, SessionEvent::Closed(_));
                let is_reading = session.on_event(event);
                if is_reading && args.count.is_some_and(|n| session.readings >= n) {
                    break StopReason::CountReached;
                }
                if closed && args.no_reconnect {
                    break StopReason::Closed { ever_opened: session.ever_opened };
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<WatchCommand>() {
                    Ok(command) => match session.run_command(command) {
                        Ok(true) => {}
                        Ok(false) => break StopReason::Quit,
                        Err(e) => eprintln!("Error: {e}"),
                    },
                    Err(e) => eprintln!("{e}"),
                },
                Ok(None) | Err(_) => {
                    debug!("stdin closed, commands disabled");
                    stdin_open = false;
                }
            },
            () = session.manager.process_next() => {}
        }
    };

    info!(?reason, readings = session.readings, "Watch finished");
    session.manager.disconnect();
    let _ = tokio::time::timeout(CLOSE_GRACE, async {
        while session.manager.current_state() != ConnectionState::Closed {
            session.manager.process_next().await;
        }
    })
    .await;

    if let Some(format) = args.export {
        if session.dashboard.log().records().is_empty() {
            eprintln!("{}", ExportError::EmptyLog);
        } else {
            let written = session.export(format.into(), args.output.as_deref())?;
            println!("Exported readings to {}", written.display());
        }
    }

    match reason {
        StopReason::Closed { ever_opened: false } => {
            let address = session.manager.address().unwrap_or("endpoint").to_string();
            Err(CliError::Connection(format!("could not connect to {address}")))
        }
        _ => Ok(()),
    }
}
