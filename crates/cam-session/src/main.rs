//! Capture session demo entry point.
//!
//! Wires the full application graph over the in-memory fake backend and runs
//! it headless: configure, start, a few zoom and capture operations, then
//! block until Ctrl-C.  The real product embeds the same graph behind a
//! platform backend and a native UI shell; this binary exists so the
//! lifecycle can be exercised end to end without camera hardware.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()           -- TOML config, defaults on first run
//!  └─ AppState::new()         -- wires controller, zoom, capture
//!       ├─ capture result router   (Tokio task)
//!       ├─ platform event pump     (Tokio task)
//!       └─ session health check    (Tokio task)
//! ```

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use async_trait::async_trait;

use cam_session::application::capture::PhotoStore;
use cam_session::infrastructure::backend::fake::FakeBackend;
use cam_session::infrastructure::storage::config::load_config;
use cam_session::infrastructure::ui_bridge::{self, AppState};

/// Demo photo store: logs each payload instead of writing a media library.
struct LoggingStore;

#[async_trait]
impl PhotoStore for LoggingStore {
    async fn store(&self, _bytes: Vec<u8>, is_raw: bool, size_bytes: usize) -> Result<(), String> {
        info!(is_raw, size_bytes, "photo stored");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("capture session demo starting");

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "could not load config; using defaults");
            Default::default()
        }
    };
    let initial_position = config.session.initial_position;

    let backend = Arc::new(FakeBackend::with_default_devices());
    let state = AppState::new(backend, Arc::new(LoggingStore), config);

    // Exercise the lifecycle once so the demo produces visible output.
    let result = ui_bridge::start_session(Arc::clone(&state), initial_position.to_string()).await;
    if !result.success {
        anyhow::bail!(
            "session failed to start: {}",
            result.error.unwrap_or_default()
        );
    }

    let zoom = ui_bridge::set_zoom(Arc::clone(&state), 2.0).await;
    if let Some(dto) = zoom.data {
        info!(applied = dto.applied, digital = dto.is_digital, "zoom applied");
    }

    let capture = ui_bridge::capture_photo(Arc::clone(&state)).await;
    match capture.data {
        Some(request_id) => info!(%request_id, "capture submitted"),
        None => warn!(error = ?capture.error, "capture failed"),
    }

    info!("capture session demo ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;

    ui_bridge::stop_session(Arc::clone(&state)).await;
    info!("capture session demo stopped");
    Ok(())
}
