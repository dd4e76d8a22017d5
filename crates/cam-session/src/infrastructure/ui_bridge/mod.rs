//! UI command bridge: exposes application-layer operations to a host UI.
//!
//! All command functions live here and delegate to the shared [`AppState`].
//! The presentation layer (whatever shell hosts the capture UI) is the only
//! consumer of this module; it must NOT be imported by the application or
//! domain layers.
//!
//! # Data Transfer Objects (DTOs)
//!
//! The backend uses internal types (`ZoomDecision`, `PublishedState`, `Uuid`)
//! that a UI shell should not depend on directly.  DTOs are simple structs
//! containing only JSON-serialisable fields, defined with
//! `#[derive(Serialize, Deserialize)]` so the host can convert them to and
//! from JSON.
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>`.  Every
//! command response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`, so the frontend
//! can always safely access `result.success` without a try/catch around the
//! call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Mutex};

use crate::application::{
    capture::{spawn_result_router, CaptureCoordinator, PhotoStore},
    events::{spawn_event_pump, spawn_health_check, PlatformEvent},
    lifecycle::SessionLifecycleController,
    transaction::{PublishedState, SessionTransactionManager},
    zoom::ZoomController,
};
use crate::infrastructure::backend::{CameraBackend, PointOfInterest};
use crate::infrastructure::storage::config::{save_config, AppConfig};
use cam_core::{Position, RecoveryPolicy, ZoomDecision};

use std::time::Duration;

// ── Shared application state ──────────────────────────────────────────────────

/// Application state shared between UI commands.
///
/// Wrapped in `Arc<>` and handed to whatever shell hosts the UI; the shell
/// injects it into every command invocation.  Commands run in an async
/// context, so the config cell uses a Tokio mutex rather than blocking an OS
/// thread while waiting for the lock.
pub struct AppState {
    /// Drives configure/start/stop/switch and interruption recovery.
    pub controller: Arc<SessionLifecycleController>,
    /// Applies zoom requests through the serialized context.
    pub zoom: ZoomController,
    /// Negotiates and submits photo captures.
    pub capture: CaptureCoordinator,
    /// UI-facing state snapshots, refreshed after every committed mutation.
    pub published: watch::Receiver<PublishedState>,
    /// The current application configuration.
    pub config: Mutex<AppConfig>,
    /// Sender half of the platform event channel; the host shell forwards
    /// its lifecycle callbacks through this.
    pub platform_events: mpsc::UnboundedSender<PlatformEvent>,
}

impl AppState {
    /// Wires the full application graph from a backend, a photo store, and
    /// the loaded configuration, and spawns the background tasks (capture
    /// result router, platform event pump, session health check).
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        store: Arc<dyn PhotoStore>,
        config: AppConfig,
    ) -> Arc<Self> {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let session = backend.make_session(results_tx);
        let (txn, published) = SessionTransactionManager::new(
            session,
            config.session.initial_position,
            RecoveryPolicy::new(config.session.max_recovery_attempts),
        );
        let controller = Arc::new(SessionLifecycleController::new(
            Arc::clone(&backend),
            Arc::clone(&txn),
            Duration::from_millis(config.session.settle_delay_ms),
        ));

        spawn_result_router(results_rx, store);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        spawn_event_pump(events_rx, Arc::clone(&controller));
        spawn_health_check(
            Arc::clone(&controller),
            Duration::from_millis(config.session.health_check_interval_ms),
        );

        Arc::new(Self {
            controller,
            zoom: ZoomController::new(Arc::clone(&txn)),
            capture: CaptureCoordinator::new(txn),
            published,
            config: Mutex::new(config),
            platform_events: events_tx,
        })
    }
}

// ── Data Transfer Objects (Presentation layer) ────────────────────────────────

/// DTO for the authoritative session state shown in the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateDto {
    pub phase: String,
    pub position: String,
    pub current_zoom: f64,
    pub available_zoom_levels: Vec<f64>,
    pub is_digital_zoom_active: bool,
    pub is_torch_on: bool,
}

impl From<&PublishedState> for SessionStateDto {
    fn from(s: &PublishedState) -> Self {
        Self {
            phase: s.phase.to_string(),
            position: s.position.to_string(),
            current_zoom: s.current_zoom,
            available_zoom_levels: s.available_zoom_levels.clone(),
            is_digital_zoom_active: s.is_digital_zoom_active,
            is_torch_on: s.is_torch_on,
        }
    }
}

/// DTO for the outcome of a zoom request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomResultDto {
    pub applied: f64,
    pub is_digital: bool,
}

impl From<ZoomDecision> for ZoomResultDto {
    fn from(d: ZoomDecision) -> Self {
        Self {
            applied: d.applied,
            is_digital: d.is_digital,
        }
    }
}

/// DTO for a tap-to-focus point in normalized coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FocusPointDto {
    pub x: f64,
    pub y: f64,
}

/// Unified response wrapper used by UI commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── UI commands ───────────────────────────────────────────────────────────────

/// Configures the session for the given position and starts it.
pub async fn start_session(state: Arc<AppState>, position: String) -> CommandResult<()> {
    let position = match position.as_str() {
        "front" => Position::Front,
        "back" => Position::Back,
        other => return CommandResult::err(format!("unknown position: {other}")),
    };
    if let Err(e) = state.controller.configure(position).await {
        return CommandResult::err(e.to_string());
    }
    if let Err(e) = state.controller.start().await {
        return CommandResult::err(e.to_string());
    }
    CommandResult::ok(())
}

/// Stops the session.
pub async fn stop_session(state: Arc<AppState>) -> CommandResult<()> {
    state.controller.stop().await;
    CommandResult::ok(())
}

/// Switches between the front and back camera.  A request arriving while a
/// switch is already in progress is dropped silently and still succeeds.
pub async fn switch_camera(state: Arc<AppState>) -> CommandResult<()> {
    match state.controller.switch_device().await {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Applies a zoom request, returning the factor actually applied.
pub async fn set_zoom(state: Arc<AppState>, requested: f64) -> CommandResult<ZoomResultDto> {
    let decision = state.zoom.set_zoom(requested).await;
    CommandResult::ok(decision.into())
}

/// Toggles the torch, returning the resulting on/off state.
pub async fn toggle_torch(state: Arc<AppState>) -> CommandResult<bool> {
    CommandResult::ok(state.controller.toggle_torch().await)
}

/// Drives a one-shot focus + exposure routine at the given point.
pub async fn focus_at_point(state: Arc<AppState>, point: FocusPointDto) -> CommandResult<()> {
    state
        .controller
        .focus_and_expose(PointOfInterest::new(point.x, point.y))
        .await;
    CommandResult::ok(())
}

/// Submits a photo capture.  Returns the correlation id of the submitted
/// request; the payload is stored asynchronously when the result arrives.
pub async fn capture_photo(state: Arc<AppState>) -> CommandResult<String> {
    match state.capture.capture().await {
        Ok(request) => CommandResult::ok(request.id.to_string()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Returns the latest published session state.
pub async fn get_session_state(state: Arc<AppState>) -> CommandResult<SessionStateDto> {
    let snapshot = state.published.borrow().clone();
    CommandResult::ok(SessionStateDto::from(&snapshot))
}

/// Persists the current configuration to disk.
pub async fn save_settings(state: Arc<AppState>) -> CommandResult<()> {
    let cfg = state.config.lock().await;
    if let Err(e) = save_config(&cfg) {
        return CommandResult::err(format!("failed to save config: {e}"));
    }
    CommandResult::ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
