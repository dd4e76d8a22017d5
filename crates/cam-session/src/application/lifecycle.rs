//! SessionLifecycleController: owns the capture session end-to-end.
//!
//! The controller drives the phase machine
//! `Uninitialized → Configuring → Idle → Running → Interrupted → Running |
//! Stopped` and is the only component that structurally mutates the session
//! resource: configure, start, stop, device switching, and
//! interruption recovery all live here.
//!
//! # Architecture
//!
//! The controller depends only on the backend traits ([`CameraBackend`] and
//! friends) and the serialized context in
//! [`SessionTransactionManager`]; all infrastructure is injected at
//! construction time, making every path testable against the fake backend.
//!
//! # The "black preview" guard
//!
//! Session state can silently diverge from what the UI assumes: the
//! resource stops running without an interruption event, or the device
//! connectivity flag goes false while an input is still attached.  An
//! external timer calls [`SessionLifecycleController::ensure_healthy`]
//! periodically; unlike the classic implementation of this pattern, the
//! remedy is bounded by the recovery policy instead of restarting blindly
//! forever.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use cam_core::{
    DeviceRegistry, InterruptionEvent, InterruptionReason, Position, RecoveryAction, SessionPhase,
    ZoomState,
};

use crate::application::transaction::{
    ConcurrentConfigurationError, SessionState, SessionTransactionManager,
};
use crate::infrastructure::backend::{
    AuthorizationStatus, CameraBackend, CameraDevice, PointOfInterest,
};

/// Error type for session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No connected device resolves for the requested position.  Fatal to
    /// the configure attempt; never retried automatically.
    #[error("no capture device available for position {0}")]
    NoDeviceAvailable(Position),
    /// The session resource rejected the device input.
    #[error("session rejected device input: {0}")]
    InputAttach(String),
    /// The session resource rejected the photo output.
    #[error("session rejected photo output: {0}")]
    OutputAttach(String),
    /// Invariant violation: see [`ConcurrentConfigurationError`].
    #[error(transparent)]
    ConcurrentConfiguration(#[from] ConcurrentConfigurationError),
    /// Camera authorization denied; terminal until external authorization
    /// changes.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The session resource refused to start.
    #[error("session failed to start: {0}")]
    Start(String),
}

/// Remedy chosen by the health check.
enum HealthRemedy {
    None,
    Restart,
    Reconfigure(Position),
}

/// Owns the capture session lifecycle.
///
/// All methods take `&self` and are safe to call from any task; every
/// mutation is re-marshaled onto the serialized context internally.
pub struct SessionLifecycleController {
    backend: Arc<dyn CameraBackend>,
    txn: Arc<SessionTransactionManager>,
    /// Single-flight flag for device switches.  Checked-and-set atomically
    /// at the start of `switch_device`, cleared via a release-on-drop guard.
    switch_in_flight: AtomicBool,
    /// Delay between stopping and restarting around a switch or recovery,
    /// because the resource can report "running" before the new input
    /// actually delivers frames.
    settle_delay: Duration,
}

impl SessionLifecycleController {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        txn: Arc<SessionTransactionManager>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            backend,
            txn,
            switch_in_flight: AtomicBool::new(false),
            settle_delay,
        }
    }

    /// Configures the session for the given logical position.
    ///
    /// Opens a transaction, removes all existing inputs and outputs,
    /// resolves and attaches the best device for `position` plus the photo
    /// output, applies best-effort capture optimizations, and commits.  On
    /// any failure after the bracket opened, the transaction still commits
    /// in its degraded partial state — it is never left open.
    ///
    /// # Errors
    ///
    /// [`SessionError::PermissionDenied`] before anything else happens;
    /// [`SessionError::NoDeviceAvailable`] if no device resolves;
    /// [`SessionError::InputAttach`] / [`SessionError::OutputAttach`] if the
    /// resource rejects attachment.
    pub async fn configure(&self, position: Position) -> Result<(), SessionError> {
        if self.backend.authorization() == AuthorizationStatus::Denied {
            return Err(SessionError::PermissionDenied);
        }
        let registry = DeviceRegistry::new(self.backend.discover_devices());
        let backend = Arc::clone(&self.backend);

        self.txn
            .run_exclusive(move |state| {
                state.set_phase(SessionPhase::Configuring);
                let token = state.begin_transaction()?;
                state.session.remove_all_io();
                state.device = None;
                state.descriptor = None;

                let attached = resolve_and_attach(state, &registry, &*backend, position);
                match attached {
                    Ok(()) => {
                        state.commit_transaction(token);
                        state.set_phase(SessionPhase::Idle);
                        state.publish();
                        info!(position = %position, "session configured");
                        Ok(())
                    }
                    Err(e) => {
                        // Commit the degraded partial state; never leave the
                        // bracket open.
                        state.commit_transaction(token);
                        state.set_phase(SessionPhase::Uninitialized);
                        state.publish();
                        warn!(position = %position, error = %e, "configure failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Starts the session.  Idempotent: starting an already-running session
    /// is a no-op.  Refused (as a logged no-op) while a configuration
    /// transaction is open or before the session was ever configured.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Start`] if the resource refuses to start.
    pub async fn start(&self) -> Result<(), SessionError> {
        self.txn
            .run_exclusive(|state| {
                if state.transaction_open() {
                    warn!("start refused: configuration transaction open");
                    return Ok(());
                }
                if state.session.is_running() {
                    // The resource keeps its running flag through an
                    // interruption; lifting one is a resume, not a restart.
                    if state.phase == SessionPhase::Interrupted {
                        state.set_phase(SessionPhase::Running);
                        state.recovery.reset();
                        state.publish();
                        info!("session resumed after interruption");
                    } else {
                        debug!("start ignored: session already running");
                    }
                    return Ok(());
                }
                if !state.phase.can_start() && state.phase != SessionPhase::Running {
                    warn!(phase = %state.phase, "start ignored in current phase");
                    return Ok(());
                }
                state
                    .session
                    .start()
                    .map_err(|e| SessionError::Start(e.to_string()))?;
                state.set_phase(SessionPhase::Running);
                // Reaching Running closes the current recovery episode.
                state.recovery.reset();
                state.publish();
                info!("session started");
                Ok(())
            })
            .await
    }

    /// Stops the session.  Idempotent: stopping an already-stopped session
    /// is a no-op.
    pub async fn stop(&self) {
        self.txn
            .run_exclusive(|state| {
                if !state.session.is_running()
                    && state.phase != SessionPhase::Running
                    && state.phase != SessionPhase::Interrupted
                {
                    debug!("stop ignored: session not running");
                    return;
                }
                state.session.stop();
                state.set_phase(SessionPhase::Stopped);
                state.publish();
                info!("session stopped");
            })
            .await
    }

    /// Switches between the front and back camera.
    ///
    /// Single-flight: a switch requested while one is already in progress is
    /// dropped silently, preventing state thrashing under rapid double-taps.
    /// If the session was running it is stopped for the duration of the
    /// switch and restarted after a short settle delay.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`configure`](Self::configure) when the
    /// target device cannot be resolved or attached.
    pub async fn switch_device(&self) -> Result<(), SessionError> {
        let Some(_guard) = SwitchGuard::try_acquire(&self.switch_in_flight) else {
            debug!("switch already in flight; request dropped");
            return Ok(());
        };

        let registry = DeviceRegistry::new(self.backend.discover_devices());
        let backend = Arc::clone(&self.backend);

        let was_running = self
            .txn
            .run_exclusive(move |state| {
                if state.descriptor.is_none() {
                    debug!("switch ignored: no device attached");
                    return Ok(None);
                }
                let was_running = state.session.is_running();
                if was_running {
                    state.session.stop();
                }
                state.set_phase(SessionPhase::Configuring);
                let token = state.begin_transaction()?;
                state.session.detach_input();
                state.device = None;

                let target = state.position.toggled();
                let attached = resolve_and_attach(state, &registry, &*backend, target);
                match attached {
                    Ok(()) => {
                        state.commit_transaction(token);
                        state.set_phase(SessionPhase::Idle);
                        state.publish();
                        info!(position = %target, "camera switched");
                        Ok(Some(was_running))
                    }
                    Err(e) => {
                        state.commit_transaction(token);
                        state.set_phase(SessionPhase::Uninitialized);
                        state.publish();
                        warn!(position = %target, error = %e, "camera switch failed");
                        Err(e)
                    }
                }
            })
            .await?;

        if let Some(was_running) = was_running {
            if was_running {
                // Let the new input settle before restarting; the resource
                // can claim "running" before frames actually flow.
                tokio::time::sleep(self.settle_delay).await;
                self.start().await?;
            }
        }
        Ok(())
    }

    /// Handles a platform interruption signal.
    ///
    /// Transitions to `Interrupted` and picks a recovery action from the
    /// bounded, reason-aware policy: restart after a settle delay,
    /// reconfigure (device gone), or wait for an external signal.
    pub async fn handle_interruption(&self, event: InterruptionEvent) {
        let action = self
            .txn
            .run_exclusive(|state| {
                if state.phase != SessionPhase::Running {
                    debug!(reason = ?event.reason, phase = %state.phase, "interruption ignored");
                    return None;
                }
                state.set_phase(SessionPhase::Interrupted);
                state.publish();
                Some(state.recovery.decide(event.reason))
            })
            .await;

        let Some(action) = action else { return };
        match action {
            RecoveryAction::RestartAfterSettle => {
                warn!(reason = ?event.reason, "capture interrupted; restarting after settle delay");
                self.txn.run_exclusive(|state| state.session.stop()).await;
                tokio::time::sleep(self.settle_delay).await;
                if let Err(e) = self.start().await {
                    warn!(error = %e, "post-interruption restart failed");
                }
            }
            RecoveryAction::Reconfigure => {
                warn!(reason = ?event.reason, "device lost during capture; reconfiguring");
                let position = self.txn.run_exclusive(|state| state.position).await;
                self.stop().await;
                match self.configure(position).await {
                    Ok(()) => {
                        if let Err(e) = self.start().await {
                            warn!(error = %e, "restart after reconfigure failed");
                        }
                    }
                    Err(e) => warn!(error = %e, "reconfigure after device loss failed"),
                }
            }
            RecoveryAction::WaitForExternalSignal => {
                info!(reason = ?event.reason, "staying interrupted until an external signal arrives");
            }
            RecoveryAction::GiveUp => {
                warn!(reason = ?event.reason, "recovery attempt budget exhausted; staying interrupted");
            }
        }
    }

    /// Handles the platform's interruption-ended signal: attempts an
    /// immediate restart if the session is currently interrupted.
    pub async fn interruption_ended(&self) {
        let interrupted = self
            .txn
            .run_exclusive(|state| state.phase == SessionPhase::Interrupted)
            .await;
        if !interrupted {
            return;
        }
        info!("interruption ended; restarting session");
        if let Err(e) = self.start().await {
            warn!(error = %e, "restart after interruption end failed");
        }
    }

    /// Periodic health check, called by an external timer.
    ///
    /// Guards against the session silently diverging from the UI's
    /// assumption that frames are flowing: restarts a session that is
    /// unexpectedly not running, and reconfigures when the active device's
    /// connectivity flag went false while an input is still attached.  Both
    /// remedies consume the recovery policy's attempt budget.
    pub async fn ensure_healthy(&self) {
        let remedy = self
            .txn
            .run_exclusive(|state| {
                if state.phase != SessionPhase::Running {
                    return HealthRemedy::None;
                }
                let device_gone = state
                    .device
                    .as_ref()
                    .map(|d| !d.is_connected())
                    .unwrap_or(false);
                if device_gone {
                    return match state.recovery.decide(InterruptionReason::DeviceDisconnected) {
                        RecoveryAction::Reconfigure => HealthRemedy::Reconfigure(state.position),
                        _ => HealthRemedy::None,
                    };
                }
                if !state.session.is_running() {
                    return match state.recovery.decide(InterruptionReason::Unknown) {
                        RecoveryAction::RestartAfterSettle => HealthRemedy::Restart,
                        _ => HealthRemedy::None,
                    };
                }
                // Healthy; close any recovery episode that was in progress.
                state.recovery.reset();
                HealthRemedy::None
            })
            .await;

        match remedy {
            HealthRemedy::None => {}
            HealthRemedy::Restart => {
                warn!("session unexpectedly not running; restarting");
                tokio::time::sleep(self.settle_delay).await;
                if let Err(e) = self.start().await {
                    warn!(error = %e, "health-check restart failed");
                }
            }
            HealthRemedy::Reconfigure(position) => {
                warn!("active device disconnected; reconfiguring");
                self.stop().await;
                match self.configure(position).await {
                    Ok(()) => {
                        if let Err(e) = self.start().await {
                            warn!(error = %e, "health-check restart after reconfigure failed");
                        }
                    }
                    Err(e) => warn!(error = %e, "health-check reconfigure failed"),
                }
            }
        }
    }

    /// Background entry: stop the session.  Ordinary idempotent stop on the
    /// serialized context, not a separate lifecycle state.
    pub async fn entered_background(&self) {
        debug!("entered background");
        self.stop().await;
    }

    /// Foreground entry: start the session again.
    pub async fn entered_foreground(&self) {
        debug!("entered foreground");
        if let Err(e) = self.start().await {
            warn!(error = %e, "restart on foreground entry failed");
        }
    }

    /// Drives a one-shot focus + exposure routine at the given point.
    ///
    /// Device errors are absorbed locally: the operation no-ops, prior
    /// device state stays intact, and the session is never torn down over a
    /// transient focus failure.
    pub async fn focus_and_expose(&self, point: PointOfInterest) {
        self.txn
            .run_exclusive(|state| match state.device.as_mut() {
                Some(device) => {
                    if let Err(e) = device.focus_and_expose(point) {
                        warn!(error = %e, "focus/expose failed; ignoring");
                    }
                }
                None => debug!("focus/expose ignored: no active device"),
            })
            .await
    }

    /// Toggles the torch, returning the resulting on/off state.
    ///
    /// On device error the toggle no-ops and the previous state is kept.
    pub async fn toggle_torch(&self) -> bool {
        self.txn
            .run_exclusive(|state| {
                let target = !state.torch_on;
                match state.device.as_mut() {
                    Some(device) => match device.set_torch(target) {
                        Ok(()) => {
                            state.torch_on = target;
                            state.publish();
                        }
                        Err(e) => warn!(error = %e, "torch toggle failed; keeping previous state"),
                    },
                    None => debug!("torch toggle ignored: no active device"),
                }
                state.torch_on
            })
            .await
    }

    /// The serialized context this controller mutates through.  Shared with
    /// the zoom controller and capture coordinator.
    pub fn transactions(&self) -> Arc<SessionTransactionManager> {
        Arc::clone(&self.txn)
    }
}

/// Resolves a device for `position` and attaches input + photo output.
///
/// Shared by configure and switch; must be called with a transaction open.
fn resolve_and_attach(
    state: &mut SessionState,
    registry: &DeviceRegistry,
    backend: &dyn CameraBackend,
    position: Position,
) -> Result<(), SessionError> {
    let descriptor = registry
        .resolve(position)
        .map_err(|_| SessionError::NoDeviceAvailable(position))?
        .clone();
    let mut device: Box<dyn CameraDevice> = backend
        .open_device(descriptor.id)
        .map_err(|e| SessionError::InputAttach(e.to_string()))?;
    state
        .session
        .attach_input(descriptor.id)
        .map_err(|e| SessionError::InputAttach(e.to_string()))?;
    if state.session.output_count() == 0 {
        state
            .session
            .attach_photo_output()
            .map_err(|e| SessionError::OutputAttach(e.to_string()))?;
    }
    // Best-effort: absence of the capability is not an error.
    if !state.session.enable_capture_optimizations() {
        debug!("capture optimizations not supported on this session");
    }
    // Re-apply continuous-auto modes so settings do not silently diverge
    // across a device change.
    if let Err(e) = device.set_continuous_auto_modes() {
        warn!(error = %e, "could not assert continuous-auto modes; continuing");
    }
    state.zoom = ZoomState::for_device(&descriptor);
    state.position = position;
    state.descriptor = Some(descriptor);
    state.device = Some(device);
    Ok(())
}

/// Release-on-drop guard for the single-flight switch flag.
struct SwitchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SwitchGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::backend::fake::FakeBackend;
    use cam_core::RecoveryPolicy;
    use tokio::sync::mpsc;

    fn make_controller(backend: FakeBackend) -> Arc<SessionLifecycleController> {
        let (results_tx, _results_rx) = mpsc::unbounded_channel();
        let session = backend.make_session(results_tx);
        let (txn, _published) =
            SessionTransactionManager::new(session, Position::Back, RecoveryPolicy::new(3));
        Arc::new(SessionLifecycleController::new(
            Arc::new(backend),
            txn,
            Duration::from_millis(50),
        ))
    }

    use crate::infrastructure::backend::CameraBackend;

    #[tokio::test]
    async fn test_configure_attaches_one_input_and_one_output() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());

        controller.configure(Position::Back).await.expect("configure");

        assert!(backend.input_device().is_some());
        assert_eq!(backend.output_count(), 1);
        assert!(!backend.is_running());
    }

    #[tokio::test]
    async fn test_configure_with_no_devices_leaves_session_empty() {
        let backend = FakeBackend::new(vec![]);
        let controller = make_controller(backend.clone());

        let result = controller.configure(Position::Back).await;

        assert!(matches!(result, Err(SessionError::NoDeviceAvailable(_))));
        assert!(backend.input_device().is_none());
        assert_eq!(backend.output_count(), 0);
        assert!(!backend.is_running());
    }

    #[tokio::test]
    async fn test_configure_denied_permission_does_nothing() {
        let backend = FakeBackend::with_default_devices();
        backend.deny_authorization();
        let controller = make_controller(backend.clone());

        let result = controller.configure(Position::Back).await;

        assert!(matches!(result, Err(SessionError::PermissionDenied)));
        assert!(backend.input_device().is_none());
    }

    #[tokio::test]
    async fn test_input_attach_failure_still_commits_transaction() {
        let backend = FakeBackend::with_default_devices();
        backend.fail_input_attach(true);
        let controller = make_controller(backend.clone());

        let result = controller.configure(Position::Back).await;
        assert!(matches!(result, Err(SessionError::InputAttach(_))));

        // The bracket must not be left open: a later configure can run.
        backend.fail_input_attach(false);
        controller.configure(Position::Back).await.expect("retry");
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");

        controller.start().await.expect("start");
        controller.start().await.expect("second start");
        assert_eq!(backend.start_calls(), 1);
        assert!(backend.is_running());

        controller.stop().await;
        controller.stop().await;
        assert_eq!(backend.stop_calls(), 1);
        assert!(!backend.is_running());
    }

    #[tokio::test]
    async fn test_start_before_configure_is_a_no_op() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());

        controller.start().await.expect("start should be a no-op");
        assert!(!backend.is_running());
        assert_eq!(backend.start_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_toggles_position_and_restarts() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        controller.switch_device().await.expect("switch");

        let front_id = backend
            .discover_devices()
            .iter()
            .find(|d| d.position == Position::Front)
            .unwrap()
            .id;
        assert_eq!(backend.input_device(), Some(front_id));
        assert!(backend.is_running(), "session restarts after switch");
    }

    #[tokio::test]
    async fn test_switch_without_configuration_is_a_no_op() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());

        controller.switch_device().await.expect("switch no-op");
        assert!(backend.input_device().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interruption_while_running_recovers_automatically() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        controller
            .handle_interruption(InterruptionEvent::now(
                InterruptionReason::DeviceInUseElsewhere,
            ))
            .await;

        assert!(backend.is_running(), "stop-then-restart recovery completed");
    }

    #[tokio::test]
    async fn test_background_interruption_waits_for_foreground() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        controller
            .handle_interruption(InterruptionEvent::now(
                InterruptionReason::NotAvailableInBackground,
            ))
            .await;
        // No blind restart: the session stays interrupted.
        let phase = controller
            .transactions()
            .run_exclusive(|state| state.phase)
            .await;
        assert_eq!(phase, SessionPhase::Interrupted);

        controller.entered_foreground().await;
        assert!(backend.is_running());
    }

    #[tokio::test]
    async fn test_interruption_ended_restarts_session() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        controller
            .handle_interruption(InterruptionEvent::now(
                InterruptionReason::NotAvailableInBackground,
            ))
            .await;
        controller.interruption_ended().await;

        assert!(backend.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_check_restarts_silently_stopped_session() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        // The resource dies underneath us without any interruption event.
        backend.force_session_running(false);
        controller.ensure_healthy().await;

        assert!(backend.is_running());
    }

    #[tokio::test]
    async fn test_health_check_reconfigures_on_lost_connectivity() {
        // Two back devices: when the triple module disconnects, the health
        // check must reconfigure onto the remaining wide module.
        let mut spare = FakeBackend::back_triple();
        spare.name = "Back Wide Camera".to_string();
        spare.tier = cam_core::CapabilityTier::Wide;
        spare.optical_zoom_tiers = vec![];
        let backend = FakeBackend::new(vec![FakeBackend::back_triple(), spare.clone()]);
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        let triple_id = backend.input_device().unwrap();
        assert_ne!(triple_id, spare.id);
        backend.set_device_connected(triple_id, false);

        controller.ensure_healthy().await;

        assert_eq!(backend.input_device(), Some(spare.id));
        assert!(backend.is_running());
    }

    #[tokio::test]
    async fn test_health_check_reconfigure_failure_consumes_attempt_budget() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        controller.start().await.expect("start");

        // The only back device disconnects; reconfigure cannot resolve a
        // replacement and the session must end up cleanly not running.
        let back_id = backend.input_device().unwrap();
        backend.set_device_connected(back_id, false);

        controller.ensure_healthy().await;
        assert!(!backend.is_running());
    }

    #[tokio::test]
    async fn test_torch_toggle_round_trip() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");

        assert!(controller.toggle_torch().await);
        assert!(backend.torch_on());
        assert!(!controller.toggle_torch().await);
        assert!(!backend.torch_on());
    }

    #[tokio::test]
    async fn test_torch_failure_keeps_previous_state() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        backend.fail_device_ops(true);

        assert!(!controller.toggle_torch().await);
        assert!(!backend.torch_on());
    }

    #[tokio::test]
    async fn test_focus_failure_is_absorbed() {
        let backend = FakeBackend::with_default_devices();
        let controller = make_controller(backend.clone());
        controller.configure(Position::Back).await.expect("configure");
        backend.fail_device_ops(true);

        // Must not panic or tear anything down.
        controller.focus_and_expose(PointOfInterest::new(0.5, 0.5)).await;
        assert_eq!(backend.focus_calls(), 0);
    }
}
