//! Chuleta TUI Entry Point
//!
//! Launches the terminal study reference.
//!
//! Configuration comes from `~/.config/chuleta/config.toml` and the
//! `CHULETA_*` environment variables; logs go to
//! `~/.local/share/chuleta/chuleta.log` (filter with `RUST_LOG`).

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::rc::Rc;

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chuleta_core::{
    default_log_path, load_config, Corpus, EspeakEngine, FileStore, MemoryStore, SharedStore,
    Viewer, ViewerConfig,
};
use chuleta_tui::App;

const DEFAULT_LOG_FILTER: &str = "chuleta=info,chuleta_core=info,chuleta_tui=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: chuleta requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    let config = load_config().context("Failed to load configuration")?;
    let viewer = build_viewer(&config)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = crossterm::terminal::size()?;
    let mut app = App::new(viewer, size);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Log to a file; the terminal belongs to the UI
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file = default_log_path().and_then(|path| {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .with(filter)
            .init(),
        None => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::sink),
            )
            .with(filter)
            .init(),
    }
}

fn build_viewer(config: &ViewerConfig) -> anyhow::Result<Viewer> {
    let corpus = match &config.corpus_path {
        Some(path) => Corpus::load(path)
            .with_context(|| format!("Failed to load corpus from {}", path.display()))?,
        None => Corpus::builtin().context("Built-in corpus is invalid")?,
    };

    let store: SharedStore = match &config.store_path {
        Some(path) => {
            let store = FileStore::open(path.clone());
            tracing::info!(path = ?store.path(), "Store opened");
            Rc::new(RefCell::new(store))
        }
        None => {
            tracing::warn!("No data directory, favorites will not be saved");
            Rc::new(RefCell::new(MemoryStore::new()))
        }
    };

    let engine = Box::new(EspeakEngine::new(config.speech_program.clone()));
    Ok(Viewer::new(corpus, store, engine, config))
}
