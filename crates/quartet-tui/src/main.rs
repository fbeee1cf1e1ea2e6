mod app;
mod config;
mod render;
mod theme;

use anyhow::Context;
use app::{App, AppAction};
use async_trait::async_trait;
use clap::Parser;
use config::{Args, FileConfig, Settings};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quartet_core::{Generator, HttpCatalog, Pause, Throttled};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::pin::pin;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "quartet_core=info,quartet=info";

/// Delay backed by the tokio timer
struct TokioPause;

#[async_trait(?Send)]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

type Catalog = Throttled<HttpCatalog, TokioPause>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let file = match args.config.clone().or_else(FileConfig::default_path) {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file)?;
    tracing::info!(scope = ?settings.generator.scope.units(), "starting");

    let catalog = Throttled::new(HttpCatalog::new(&settings.catalog), TokioPause, settings.throttle);
    let generator = Generator::new(catalog, settings.generator.clone());
    let mut app = App::new(settings.theme);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, &mut app, &generator, settings.fresh_pool).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

/// Log to a file when asked; stdout belongs to the board
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("failed to open log file {:?}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Next key press, polling without blocking the runtime
async fn next_key() -> io::Result<KeyEvent> {
    loop {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(33)).await;
    }
}

async fn run_app(
    stdout: &mut io::Stdout,
    app: &mut App,
    generator: &Generator<Catalog>,
    fresh_pool: bool,
) -> anyhow::Result<()> {
    let mut fresh = fresh_pool;
    let mut pending = true;
    let mut last_tick = Instant::now();

    loop {
        if pending {
            pending = false;
            app.begin_generation();
            render::render(stdout, app)?;
            stdout.flush()?;

            let ticket = generator.guard().begin();
            let mut generation = pin!(generator.generate_guarded(&ticket, fresh));
            fresh = false;
            // keep the board responsive while the catalog is queried
            loop {
                tokio::select! {
                    result = &mut generation => {
                        app.finish_generation(result);
                        break;
                    }
                    key = next_key() => {
                        if app.handle_key(key?) == AppAction::Quit {
                            return Ok(());
                        }
                        render::render(stdout, app)?;
                        stdout.flush()?;
                    }
                }
            }
        }

        let tick_rate = app.tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.handle_key(key) {
                    AppAction::Continue => {}
                    AppAction::NewGame => pending = true,
                    AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
