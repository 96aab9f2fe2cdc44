mod app;
mod cache;
mod config;
mod error;
mod event;
mod model;
mod provider;
mod status;
mod sync;
mod ui;
mod views;

use std::io;
use std::panic;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use app::{Action, App};
use cache::SnapshotCache;
use provider::trello::TrelloProvider;
use status::local::FileBackend;
use status::remote::RemoteBackend;
use status::{StatusBackend, StatusStore};
use sync::SyncService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = config::load_config()?;
    let board_id = config.trello.as_ref().map(|t| t.board_id.clone());
    let data_dir = config::data_dir();

    // Wire up provider, status store and cache
    let provider = TrelloProvider::new(config.trello);
    let remote: Option<Box<dyn StatusBackend>> = config
        .remote_store
        .as_ref()
        .map(|rc| Box::new(RemoteBackend::new(rc)) as Box<dyn StatusBackend>);
    let store = StatusStore::new(remote, Box::new(FileBackend::new(data_dir.clone())));
    let cache = SnapshotCache::new(data_dir);
    let service = SyncService::new(
        Box::new(provider),
        store,
        cache,
        board_id.clone(),
        config.user.id.clone(),
        &config.sync,
    );

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app
    let mut app = App::new(service, board_id.clone(), action_tx.clone());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Spawn event reader
    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    // Initial sync (cache-first) and the recurring timer
    if let Some(board_id) = &board_id {
        if let Err(e) = app.service.sync(board_id, false).await {
            app.flash_message = Some((format!("Sync failed: {e}"), std::time::Instant::now()));
        }
        app.service.start_auto_sync(board_id, action_tx.clone());
    }

    // Main loop
    loop {
        // Render
        terminal.draw(|f| ui::render(f, &app))?;

        // Wait for action
        if let Some(action) = action_rx.recv().await {
            app.update(action).await;
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    app.service.stop_auto_sync();

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
