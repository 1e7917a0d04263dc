//! Timer App - countdown timer service
//!
//! This is the main entry point for the timer-app server.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use timer_app::{
    api::create_router,
    config::Config,
    notify::{audio::AudioEngine, desktop::Notifier, desktop::APP_NAME, title::TerminalTitle},
    runtime::{TimerRuntime, FULLSCREEN_DELAY},
    state::AppState,
    store::{ConfigStore, FileStore, MemoryStore},
    tasks::resume_persisted_timer,
    utils::shutdown_signal,
    NotificationDispatcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "timer_app={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting timer-app server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms",
        config.host, config.port, config.tick_ms
    );

    let store = if config.ephemeral {
        info!("Ephemeral mode: timers and settings are kept in memory only");
        ConfigStore::new(Arc::new(MemoryStore::new()))
    } else {
        let data_dir = config.data_dir();
        info!("Data directory: {}", data_dir.display());
        let file_store = FileStore::open(&data_dir)
            .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
        ConfigStore::new(Arc::new(file_store))
    };

    let dispatcher = Arc::new(
        NotificationDispatcher::new(
            store.settings(),
            Arc::new(AudioEngine::new()),
            Box::new(Notifier::new()),
            Arc::new(TerminalTitle::new(APP_NAME)),
        )
        .with_store(store.clone()),
    );
    let runtime = TimerRuntime::with_timing(
        store.clone(),
        dispatcher.clone(),
        config.tick_period(),
        FULLSCREEN_DELAY,
    );

    // Pick up a run interrupted by the last shutdown
    resume_persisted_timer(&runtime, &store).await;

    if let Some(id) = &config.activate {
        match store.find_timer(id) {
            Some(timer) => {
                runtime.activate(timer).await?;
            }
            None => warn!("--activate: no saved timer with id {}", id),
        }
    }
    if config.start {
        if let Err(e) = runtime.start().await {
            warn!("--start ignored: {}", e);
        }
    }

    let state = Arc::new(AppState::new(
        store,
        runtime.clone(),
        dispatcher,
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /health                - Health check");
    info!("  GET    /timers                - List saved timers");
    info!("  POST   /timers                - Create a timer");
    info!("  GET    /timers/:id            - Show a timer");
    info!("  PUT    /timers/:id            - Replace a timer");
    info!("  DELETE /timers/:id            - Delete a timer");
    info!("  POST   /timers/:id/intervals  - Add an alert interval");
    info!("  POST   /timers/:id/activate   - Make a timer active");
    info!("  GET    /active                - Current countdown view");
    info!("  POST   /active/start          - Start or resume");
    info!("  POST   /active/pause          - Toggle pause");
    info!("  POST   /active/stop           - Stop and reset");
    info!("  DELETE /active                - Deactivate");
    info!("  GET    /settings              - Notification settings");
    info!("  PATCH  /settings              - Update notification settings");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    runtime.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
