mod app;
mod http;
mod ui;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use coread_config::Config;
use coread_engine::{DocumentId, OfflineApi, ReaderApi, ReaderSession, read_pipeline_output};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::OpenOptions,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    time::Duration,
};

use crate::app::App;
use crate::http::HttpApi;

/// Read a document alongside the agent discussions anchored to its text
#[derive(Debug, Parser)]
#[command(version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["document_id", "file"])))]
struct Args {
    /// Base URL of the document service (overrides config and COREAD_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Open a document from the backend
    #[arg(long)]
    document_id: Option<String>,

    /// Open pipeline output (`{document, threads}` JSON) without a backend
    #[arg(long)]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve().with_context(|| {
        format!(
            "Failed to load config file at {}",
            Config::config_path().display()
        )
    })?;
    if let Some(url) = args.api_url {
        config.api_url = url;
    }

    init_logging(&config.log_path())?;
    log::info!("coread-cli starting, api at {}", config.api_base());

    let runtime = app::runtime()?;
    let (session, api): (ReaderSession, Box<dyn ReaderApi>) = if let Some(path) = &args.file {
        let output = read_pipeline_output(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let session = ReaderSession::load(output.document, output.threads);
        (session, Box::new(OfflineApi) as Box<dyn ReaderApi>)
    } else if let Some(document_id) = &args.document_id {
        let api = HttpApi::new(config.api_base())?;
        let session = runtime
            .block_on(ReaderSession::load_remote(
                &DocumentId(document_id.clone()),
                &api,
            ))
            .with_context(|| format!("Failed to open document {document_id}"))?;
        (session, Box::new(api) as Box<dyn ReaderApi>)
    } else {
        anyhow::bail!("either --document-id or --file is required");
    };

    let mut app = App::new(session, api, runtime);
    app.wrap_width = config.wrap_width;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("reader loop failed: {err:?}");
        println!("{err:?}");
    }

    Ok(())
}

/// Log to a file; the terminal is owned by the UI. `RUST_LOG` overrides the
/// default `info` filter.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::ui(f, app))?;

        // The frame above shows the pending state; await the work, then drop
        // whatever was typed meanwhile
        if app.pending.is_some() {
            app.run_pending();
            discard_queued_input(app)?;
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.is_press() => app.handle_key(key),
            Event::Resize(_, _) => app.resized(),
            _ => {}
        }
    }
    Ok(())
}

fn discard_queued_input(app: &mut App) -> Result<()> {
    while event::poll(Duration::ZERO)? {
        if let Event::Resize(_, _) = event::read()? {
            app.resized();
        }
    }
    Ok(())
}
