//! Countdown Timer - A state-managed countdown timer
//!
//! This is the main entry point for the countdown-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_timer::{
    api::create_router,
    config::Config,
    state::{AppState, Field, TimerController},
    tasks::state_logger_task,
    utils::shutdown_signal,
};

/// Apply the command-line preset in a single update
fn apply_preset(controller: &TimerController, config: &Config) {
    controller.preset(&[
        (Field::Hours, config.hours),
        (Field::Minutes, config.minutes),
        (Field::Seconds, config.seconds),
    ]);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, preset={}h {}m {}s, autostart={}",
          config.host, config.port, config.hours, config.minutes, config.seconds, config.autostart);

    let controller = TimerController::new();

    // Log countdown transitions
    tokio::spawn(state_logger_task(Arc::clone(&controller)));

    apply_preset(&controller, &config);
    if config.autostart {
        controller.start_countdown();
    }

    // Create application state
    let state = Arc::new(AppState::with_controller(
        Arc::clone(&controller),
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /fields/:field/inc - Increment hours, minutes or seconds");
    info!("  POST /fields/:field/dec - Decrement hours, minutes or seconds");
    info!("  POST /start             - Start or restart the countdown");
    info!("  POST /reset             - Stop the countdown and clear the fields");
    info!("  GET  /status            - Current timer state");
    info!("  GET  /events            - Server-sent timer updates");
    info!("  GET  /health            - Health check");

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

    controller.reset();
    info!("Server shutdown complete");
    Ok(())
}
