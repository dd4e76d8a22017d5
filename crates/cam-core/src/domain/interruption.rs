//! Interruption taxonomy and the recovery policy.
//!
//! The platform suspends capture for reasons outside the application's
//! control: another app grabbed the camera, the app moved to the background,
//! the device was unplugged.  Naive controllers tend to poll forever and
//! blindly restart, which masks the root cause.  The policy here is
//! deliberately reason-aware and attempt-bounded:
//! a background restriction waits for the foreground signal instead of
//! burning restart attempts that are known to fail, and a disconnect goes
//! straight to reconfiguration.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Why the platform suspended capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionReason {
    /// Another process is using the capture device.
    DeviceInUseElsewhere,
    /// Audio/video capture is restricted while the app is backgrounded.
    NotAvailableInBackground,
    /// The device was physically or logically disconnected.
    DeviceDisconnected,
    /// The system suspended capture under thermal or memory pressure.
    SystemPressure,
    /// The platform gave no usable reason code.
    Unknown,
}

/// A platform-issued interruption signal.
///
/// Transient: consumed by the recovery state machine and not retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterruptionEvent {
    pub reason: InterruptionReason,
    pub at: Instant,
}

impl InterruptionEvent {
    pub fn now(reason: InterruptionReason) -> Self {
        Self {
            reason,
            at: Instant::now(),
        }
    }
}

/// What the lifecycle controller should do about an interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Stop, wait the settle delay, then restart.
    RestartAfterSettle,
    /// The device is gone; run a full `configure()` to re-resolve it.
    Reconfigure,
    /// Restarting now is known to fail; wait for an external signal
    /// (interruption-ended or foreground entry) instead.
    WaitForExternalSignal,
    /// Attempt budget exhausted for this episode; stay interrupted until an
    /// external signal arrives.
    GiveUp,
}

/// Bounded, reason-aware recovery decision maker.
///
/// One *episode* spans from the first interruption until the session reaches
/// `Running` again (the controller calls [`RecoveryPolicy::reset`] at that
/// point).  Active recovery actions within an episode are capped at
/// `max_attempts`; passive waits do not consume the budget.
#[derive(Debug, Clone)]
pub struct RecoveryPolicy {
    max_attempts: u32,
    attempts: u32,
}

impl RecoveryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: 0,
        }
    }

    /// Number of active recovery attempts consumed in the current episode.
    pub fn attempts_used(&self) -> u32 {
        self.attempts
    }

    /// Decides the recovery action for an interruption reason, consuming one
    /// attempt from the episode budget for active actions.
    pub fn decide(&mut self, reason: InterruptionReason) -> RecoveryAction {
        match reason {
            InterruptionReason::NotAvailableInBackground => RecoveryAction::WaitForExternalSignal,
            InterruptionReason::DeviceDisconnected => {
                if self.consume_attempt() {
                    RecoveryAction::Reconfigure
                } else {
                    RecoveryAction::GiveUp
                }
            }
            InterruptionReason::DeviceInUseElsewhere
            | InterruptionReason::SystemPressure
            | InterruptionReason::Unknown => {
                if self.consume_attempt() {
                    RecoveryAction::RestartAfterSettle
                } else {
                    RecoveryAction::GiveUp
                }
            }
        }
    }

    /// Clears the episode budget.  Called when the session reaches `Running`.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    fn consume_attempt(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        self.attempts += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_restriction_waits_for_external_signal() {
        let mut policy = RecoveryPolicy::new(3);
        assert_eq!(
            policy.decide(InterruptionReason::NotAvailableInBackground),
            RecoveryAction::WaitForExternalSignal
        );
        // Passive waits never consume the budget.
        assert_eq!(policy.attempts_used(), 0);
    }

    #[test]
    fn test_device_in_use_restarts_after_settle() {
        let mut policy = RecoveryPolicy::new(3);
        assert_eq!(
            policy.decide(InterruptionReason::DeviceInUseElsewhere),
            RecoveryAction::RestartAfterSettle
        );
        assert_eq!(policy.attempts_used(), 1);
    }

    #[test]
    fn test_disconnect_triggers_reconfigure() {
        let mut policy = RecoveryPolicy::new(3);
        assert_eq!(
            policy.decide(InterruptionReason::DeviceDisconnected),
            RecoveryAction::Reconfigure
        );
    }

    #[test]
    fn test_budget_exhaustion_gives_up() {
        let mut policy = RecoveryPolicy::new(2);
        policy.decide(InterruptionReason::DeviceInUseElsewhere);
        policy.decide(InterruptionReason::DeviceInUseElsewhere);
        assert_eq!(
            policy.decide(InterruptionReason::DeviceInUseElsewhere),
            RecoveryAction::GiveUp
        );
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut policy = RecoveryPolicy::new(1);
        policy.decide(InterruptionReason::SystemPressure);
        assert_eq!(
            policy.decide(InterruptionReason::SystemPressure),
            RecoveryAction::GiveUp
        );
        policy.reset();
        assert_eq!(
            policy.decide(InterruptionReason::SystemPressure),
            RecoveryAction::RestartAfterSettle
        );
    }

    #[test]
    fn test_zero_budget_always_gives_up() {
        let mut policy = RecoveryPolicy::new(0);
        assert_eq!(
            policy.decide(InterruptionReason::Unknown),
            RecoveryAction::GiveUp
        );
    }
}
