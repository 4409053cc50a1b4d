//! Landing Display - A state-managed HTTP server for landing-page display state
//! 
//! This is the main entry point for the landing-display application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use landing_display::{
    api::create_router,
    config::{Config, PlayerMode},
    host::{MediaElement, SimulatedMedia, SystemClock},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("landing_display={},tower_http=info", config.log_level()))
        .init();

    info!("Starting landing-display server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, mode={}, rollover={:?}",
          config.host, config.port, config.mode.as_str(), config.rollover);

    let simulated = match config.mode {
        PlayerMode::Mock => None,
        PlayerMode::Media => Some(Arc::new(SimulatedMedia::new(
            config.media_duration,
            config.block_autoplay,
        ))),
    };
    let media = simulated.clone().map(|m| m as Arc<dyn MediaElement>);

    // Create display state and start its timers; dropping `display` tears everything down
    let state = Arc::new(AppState::new(
        config.display_settings(),
        Arc::new(SystemClock),
        media,
        config.host.clone(),
        config.port,
    ));
    let display = Arc::clone(&state).mount()?;

    if let Some(media) = &simulated {
        media.load();
    }

    // Create HTTP router with all endpoints
    let app = create_router(display.state());

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /countdown             - Countdown readout");
    info!("  GET  /player                - Player readout");
    info!("  POST /player/toggle         - Play or pause");
    info!("  POST /player/seek           - Seek to a fraction of the track");
    info!("  POST /player/rate           - Change playback rate");
    info!("  POST /player/skip           - Skip forward or back (media mode)");
    info!("  POST /reveal/observe        - Register elements for reveal");
    info!("  POST /reveal/intersections  - Report element positions");
    info!("  GET  /reveal                - Reveal flags per element");
    info!("  POST /scroll                - Report scroll offset");
    info!("  POST /anchor                - Scroll target for an anchor");
    info!("  GET  /status                - Full display status");
    info!("  GET  /events                - Snapshot event stream");
    info!("  GET  /health                - Health check");

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

    drop(display);
    info!("Server shutdown complete");
    Ok(())
}
