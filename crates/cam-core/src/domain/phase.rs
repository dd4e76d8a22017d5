//! Session lifecycle phases.
//!
//! The session progresses through these phases:
//!
//! ```text
//! Uninitialized ──► Configuring ──► Idle ──► Running ◄──► Interrupted
//!                        ▲           │          │              │
//!                        └───────────┴──────► Stopped ◄────────┘
//! ```
//!
//! - `Uninitialized`: no configuration has ever been applied.
//! - `Configuring`: a configuration transaction is in flight.
//! - `Idle`: configured but not started (`running == false`).
//! - `Running`: frames are flowing.
//! - `Interrupted`: the platform suspended capture; recovery is pending.
//! - `Stopped`: explicitly stopped (background entry or user action).

use serde::{Deserialize, Serialize};

/// Current phase of the capture session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    Configuring,
    Idle,
    Running,
    Interrupted,
    Stopped,
}

impl SessionPhase {
    /// Whether `start()` makes sense in this phase.
    ///
    /// Starting from `Running` is an idempotent no-op, handled by the caller;
    /// starting from `Uninitialized` or mid-configuration is refused.
    pub fn can_start(self) -> bool {
        matches!(
            self,
            SessionPhase::Idle | SessionPhase::Stopped | SessionPhase::Interrupted
        )
    }

    /// Whether the session is expected to be delivering frames.
    pub fn expects_frames(self) -> bool {
        self == SessionPhase::Running
    }

    /// Whether a configuration transaction may be opened in this phase.
    pub fn can_configure(self) -> bool {
        self != SessionPhase::Configuring
    }

    /// Checks whether a direct transition to `next` is legal.
    ///
    /// The controller asserts this on every phase change; an illegal
    /// transition indicates a controller bug, not a runtime condition.
    pub fn can_transition(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Uninitialized, Configuring) => true,
            (Configuring, Idle) => true,
            // A failed configure may leave the session unconfigured again.
            (Configuring, Uninitialized) => true,
            (Idle, Running) | (Idle, Configuring) => true,
            (Running, Interrupted) | (Running, Stopped) | (Running, Configuring) => true,
            (Interrupted, Running) | (Interrupted, Stopped) | (Interrupted, Configuring) => true,
            (Stopped, Running) | (Stopped, Configuring) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::Configuring => "configuring",
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Interrupted => "interrupted",
            SessionPhase::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}
