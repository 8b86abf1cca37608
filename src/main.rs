// ABOUTME: Entry point for cardiocheck: sets up logging, routes CLI commands, runs the TUI loop

#![allow(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::{
    io::{self, IsTerminal},
    time::{Duration, Instant},
};

use cardiocheck::api::CardioApiClient;
use cardiocheck::app::{App, EventHandler};
use cardiocheck::cli::{self, util::resolve_location, Commands, LocationArgs};
use cardiocheck::components::LayoutComponent;
use cardiocheck::config::{self, AppConfig};
use cardiocheck::session::SessionStore;

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn cleanup_terminal_with_instance<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file so the TUI owns stdout
    setup_logging();
    setup_panic_handler();

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(Commands::Login(login_args)) => cli::auth::login(login_args, args.format).await,
        Some(Commands::Register(register_args)) => cli::auth::register(register_args, args.format).await,
        Some(Commands::Logout) => cli::auth::logout(args.format),
        Some(Commands::Whoami) => cli::auth::whoami(args.format).await,
        Some(Commands::Profile(profile_args)) => cli::auth::profile(profile_args, args.format).await,
        Some(Commands::Predict(predict_args)) => cli::predict::execute(predict_args, args.format).await,
        Some(Commands::Fields) => cli::fields::execute(args.format),
        Some(Commands::Tui(location)) => launch_tui(location).await,
        None => launch_tui(LocationArgs::default()).await,
    };

    if result.is_err() {
        cleanup_terminal();
    }

    result
}

async fn launch_tui(location: LocationArgs) -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    let store = SessionStore::open_default()?;
    let session = store.load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring stored session: {}", e);
        Default::default()
    });
    let client = CardioApiClient::new(&config)?;
    let coordinates = resolve_location(&location, &config);

    let mut app = App::new(config, session, client, Some(store));
    app.state.location = coordinates;
    let layout = LayoutComponent::new();

    tracing::info!(
        authenticated = app.state.session.is_authenticated(),
        "Starting TUI"
    );

    // Drain any buffered input so stray keys don't act on the first frame
    while event::poll(Duration::from_millis(10)).unwrap_or(false) {
        let _ = event::read();
    }

    run_tui(&mut app, &layout).await
}

async fn run_tui(app: &mut App, layout: &LayoutComponent) -> Result<()> {
    if !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!(
            "No TTY detected. This application requires a terminal.\n\
             Use 'cardiocheck predict' for scripted use."
        ));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui_loop(app, layout, &mut terminal).await;

    if let Err(e) = cleanup_terminal_with_instance(&mut terminal) {
        tracing::error!("Failed to cleanup terminal: {}", e);
        cleanup_terminal();
    }

    result
}

async fn run_tui_loop(
    app: &mut App,
    layout: &LayoutComponent,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    let startup_time = Instant::now();
    const STARTUP_GUARD_MS: u64 = 100;

    loop {
        terminal.draw(|frame| layout.render(frame, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                if startup_time.elapsed() < Duration::from_millis(STARTUP_GUARD_MS) {
                    tracing::debug!("Ignoring key event {:?} during startup guard period", key_event.code);
                    continue;
                }

                if let Some(app_event) = EventHandler::handle_key_event(key_event, &mut app.state) {
                    EventHandler::process_event(app_event, &mut app.state);
                }

                // Start requested work right away instead of waiting for the tick
                if app.state.pending_async_action.is_some() {
                    app.tick().await?;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if let Err(e) = app.tick().await {
                tracing::error!("Error during app tick: {}", e);
            }
            last_tick = Instant::now();
        }

        if app.state.should_quit {
            break;
        }
    }

    Ok(())
}

fn setup_logging() {
    use std::fs::OpenOptions;
    use tracing_subscriber::prelude::*;

    let log_dir = config::logs_dir().unwrap_or_else(|_| std::path::PathBuf::from(".cardiocheck/logs"));
    let _ = std::fs::create_dir_all(&log_dir);

    let log_file = log_dir.join(format!(
        "cardiocheck-{}.jsonl",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));

    // Logging is best effort; without a file the app runs silently
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_file) else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_writer(file)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardiocheck=info".into()),
        )
        .init();
}

fn setup_panic_handler() {
    use tracing::error;

    std::panic::set_hook(Box::new(|panic_info| {
        // Ensure terminal is restored before logging the panic
        cleanup_terminal();

        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        eprintln!("Please check the logs in ~/.cardiocheck/logs for more details.");
    }));
}
