//! orb - run orbitfile's background file operations from the command line.
//!
//! Usage:
//!   orb copy <SOURCES>... --to <DIR>      Copy into a directory
//!   orb move <SOURCES>... --to <DIR>      Move into a directory
//!   orb delete <PATHS>...                 Move to trash (or delete with --permanent)
//!   orb compress <SOURCES>... [--to DIR]  Zip the sources
//!   orb extract <ARCHIVE>                 Extract next to the archive
//!   orb encrypt <PATH>                    Encrypt with a passphrase
//!   orb decrypt <PATH>                    Decrypt a .age / .tar.age file
//!   orb --help                            Show help

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, IsTerminal, Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail};
use ratatui::backend::CrosstermBackend;
use ratatui::{Terminal, TerminalOptions, Viewport};
use tracing_subscriber::EnvFilter;

use orbitfile_core::{EngineConfig, OperationState};
use orbitfile_ops::SecretString;
use orbitfile_tui::app::{LINES_PER_PROCESS, TICK_INTERVAL_MS};
use orbitfile_tui::{Action, ConfirmModal, ConfirmationRequest, Dispatch, Engine, ProcessBar};

/// Inline rows reserved for the confirmation dialog.
const CONFIRM_VIEW_HEIGHT: u16 = 9;

#[derive(Parser)]
#[command(
    name = "orb",
    version,
    about = "Background file operations with live progress",
    long_about = "orb runs copy, move, delete, compress, extract, encrypt and decrypt \
                  operations on background tasks and shows their progress.\n\n\
                  Logs go to orb.log in the system temp directory; set ORB_LOG to \
                  change the filter (e.g. ORB_LOG=debug)."
)]
struct Cli {
    /// Engine settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the final operation records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy files or directories into a directory
    Copy {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Destination directory
        #[arg(short, long)]
        to: PathBuf,
    },

    /// Move files or directories into a directory
    Move {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Destination directory
        #[arg(short, long)]
        to: PathBuf,
    },

    /// Delete files or directories
    Delete {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Remove permanently instead of moving to trash
        #[arg(short, long)]
        permanent: bool,

        /// Answer yes to confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// Compress into a zip archive named after the first source
    Compress {
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Directory the archive is written to
        #[arg(short, long, default_value = ".")]
        to: PathBuf,
    },

    /// Extract an archive into a directory next to it
    Extract { archive: PathBuf },

    /// Encrypt a file or directory with a passphrase
    Encrypt {
        path: PathBuf,

        #[arg(long, env = "ORB_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },

    /// Decrypt a .age file or .tar.age directory archive
    Decrypt {
        path: PathBuf,

        #[arg(long, env = "ORB_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli.command, config, cli.json))
}

/// Log to a file so progress drawing is never disturbed.
fn init_logging() -> Result<()> {
    let path = std::env::temp_dir().join("orb.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("ORB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
    let config: EngineConfig =
        toml::from_str(&text).wrap_err_with(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

async fn run(command: Command, config: EngineConfig, json: bool) -> Result<()> {
    let mut engine = Engine::new(config)?;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let outcome = match command {
        Command::Copy { sources, to } => paste(&mut engine, Action::Copy, &sources, &to)?,
        Command::Move { sources, to } => paste(&mut engine, Action::Cut, &sources, &to)?,
        Command::Delete {
            paths,
            permanent,
            yes,
        } => {
            let paths = absolute_all(&paths)?;
            match engine.dispatch(Action::Delete { permanent }, &paths, &cwd)? {
                Dispatch::NeedsConfirmation(request) => {
                    if yes || ask(&request)? {
                        engine.confirm_pending();
                    } else {
                        engine.cancel_pending();
                        println!("Cancelled.");
                    }
                    Dispatch::NeedsConfirmation(request)
                }
                other => other,
            }
        }
        Command::Compress { sources, to } => {
            let sources = absolute_all(&sources)?;
            engine.dispatch(Action::Compress, &sources, &std::path::absolute(&to)?)?
        }
        Command::Extract { archive } => {
            let archive = std::path::absolute(&archive)?;
            engine.dispatch(Action::Extract, &[archive], &cwd)?
        }
        Command::Encrypt { path, passphrase } => {
            let passphrase = SecretString::from(passphrase.unwrap_or_default());
            let path = std::path::absolute(&path)?;
            engine.dispatch(Action::Encrypt { passphrase }, &[path], &cwd)?
        }
        Command::Decrypt { path, passphrase } => {
            let passphrase = SecretString::from(passphrase.unwrap_or_default());
            let path = std::path::absolute(&path)?;
            engine.dispatch(Action::Decrypt { passphrase }, &[path], &cwd)?
        }
    };
    tracing::debug!(?outcome, "Dispatched");

    let live = !json && io::stdout().is_terminal();
    drive(&mut engine, live).await?;
    report(&engine, json)
}

/// Load the clipboard from `sources`, then paste into `to`.
fn paste(engine: &mut Engine, action: Action, sources: &[PathBuf], to: &Path) -> Result<Dispatch> {
    let sources = absolute_all(sources)?;
    let origin = sources
        .first()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    engine.dispatch(action, &sources, &origin)?;
    Ok(engine.dispatch(Action::Paste, &[], &std::path::absolute(to)?)?)
}

fn absolute_all(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths
        .iter()
        .map(|p| std::path::absolute(p).wrap_err_with(|| format!("Invalid path {}", p.display())))
        .collect()
}

/// Show the confirmation dialog and read a y/N answer from stdin.
fn ask(request: &ConfirmationRequest) -> Result<bool> {
    if io::stdout().is_terminal() {
        let mut terminal = Terminal::with_options(
            CrosstermBackend::new(io::stdout()),
            TerminalOptions {
                viewport: Viewport::Inline(CONFIRM_VIEW_HEIGHT),
            },
        )?;
        terminal.draw(|frame| frame.render_widget(ConfirmModal::new(request), frame.area()))?;
        terminal.show_cursor()?;
        println!();
        print!("[y/N] ");
    } else {
        print!("{}: {} [y/N] ", request.title, request.content);
    }
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Inline viewport showing the process list while operations run.
struct LiveView {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl LiveView {
    fn new(entries: usize) -> Result<Self> {
        // Border plus entries; the last entry drops its spacer line.
        let height = (entries * LINES_PER_PROCESS + 1) as u16;
        let terminal = Terminal::with_options(
            CrosstermBackend::new(io::stdout()),
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        )?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, engine: &Engine) -> Result<()> {
        self.terminal.draw(|frame| {
            frame.render_widget(ProcessBar::new(engine.registry()), frame.area());
        })?;
        Ok(())
    }
}

/// Render loop: apply progress events until every operation has finished.
async fn drive(engine: &mut Engine, live: bool) -> Result<()> {
    if !engine.registry().has_running() {
        return Ok(());
    }

    let mut view = if live {
        Some(LiveView::new(engine.registry().len())?)
    } else {
        None
    };
    let mut tick = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));

    while engine.registry().has_running() {
        tokio::select! {
            biased;

            Some(event) = engine.next_event() => {
                engine.handle_event(event);
                engine.drain_pending();
            }

            _ = tick.tick() => {
                if let Some(view) = view.as_mut() {
                    view.draw(engine)?;
                }
            }
        }
    }

    if let Some(view) = view.as_mut() {
        view.draw(engine)?;
        println!();
    }
    Ok(())
}

fn report(engine: &Engine, json: bool) -> Result<()> {
    let operations: Vec<_> = engine.registry().iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&operations)?);
    } else if !io::stdout().is_terminal() {
        for op in &operations {
            println!("[{}] {}", op.state, op.label());
        }
    }

    let failed = operations
        .iter()
        .filter(|op| op.state == OperationState::Failed)
        .count();
    if failed > 0 {
        bail!("{failed} operation(s) failed");
    }
    Ok(())
}
