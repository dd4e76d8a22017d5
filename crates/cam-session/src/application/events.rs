//! Platform event pump: re-marshals platform callbacks onto the serialized
//! session context.
//!
//! Platform notifications (interruptions, app foreground/background moves)
//! arrive on arbitrary callback threads.  The platform adapter only pushes a
//! [`PlatformEvent`] onto a channel; the pump task spawned here drains the
//! channel and calls into the lifecycle controller, so every reaction runs
//! through the serialized context like any other mutation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use cam_core::{InterruptionEvent, InterruptionReason};

use crate::application::lifecycle::SessionLifecycleController;

/// A lifecycle-relevant notification from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The platform suspended capture for the given reason.
    InterruptionBegan(InterruptionReason),
    /// The platform lifted the interruption.
    InterruptionEnded,
    /// The app moved to the background.
    EnteredBackground,
    /// The app moved to the foreground.
    EnteredForeground,
}

/// Spawns the task that drains platform events into the controller.
///
/// Runs until the sender side is dropped.
pub fn spawn_event_pump(
    mut events: mpsc::UnboundedReceiver<PlatformEvent>,
    controller: Arc<SessionLifecycleController>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "platform event");
            match event {
                PlatformEvent::InterruptionBegan(reason) => {
                    controller
                        .handle_interruption(InterruptionEvent::now(reason))
                        .await;
                }
                PlatformEvent::InterruptionEnded => controller.interruption_ended().await,
                PlatformEvent::EnteredBackground => controller.entered_background().await,
                PlatformEvent::EnteredForeground => controller.entered_foreground().await,
            }
        }
        debug!("platform event channel closed; pump exiting");
    })
}

/// Spawns the periodic session health check.
///
/// Ticks forever at `interval`; each tick runs
/// [`SessionLifecycleController::ensure_healthy`], which is a cheap no-op
/// while the session is healthy or not running.
pub fn spawn_health_check(
    controller: Arc<SessionLifecycleController>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            controller.ensure_healthy().await;
        }
    })
}
