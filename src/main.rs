mod audio;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use audio::{player_event_channel, CpalBackend};
use config::AppConfig;
use controller::AppController;
use model::{spawn_fetch, AppModel, DeezerClient};
use view::AppView;

const INPUT_POLL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== deezer-rs starting ===");

    let config = AppConfig::from_env();
    tracing::info!(
        endpoint = %config.endpoint,
        query = %config.query,
        rapidapi = config.credentials.is_some(),
        "Configuration loaded"
    );

    let client = DeezerClient::new(&config)?;

    let model = Arc::new(Mutex::new(AppModel::new()));
    let (event_tx, event_rx) = player_event_channel();
    let controller = AppController::new(model.clone(), Box::new(CpalBackend::new(event_tx)));
    controller.start_player_event_listener(event_rx);

    // One fetch, delivered once; the list shows "Loading..." until it lands
    let pending = spawn_fetch(client, config.query.clone());
    let controller_for_load = controller.clone();
    tokio::spawn(async move {
        controller_for_load.load_tracks(pending).await;
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller.clone(), &config.query).await;

    controller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("deezer-rs shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    query: &str,
) -> io::Result<()> {
    loop {
        let (ui_state, playlist, should_quit) = {
            let model_guard = model.lock().await;

            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_ui_state().await,
                model_guard.get_playlist().await,
                model_guard.should_quit().await,
            )
        };
        let playback = controller.get_playback_info().await;

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &playlist, query);
        })?;

        if should_quit {
            break;
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
