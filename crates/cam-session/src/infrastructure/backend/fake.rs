//! In-memory fake camera backend for tests and the headless demo.
//!
//! Allows tests to script device lists, failure injection, and transient
//! quirks (like the empty RAW format list right after reconfiguration)
//! without requiring camera hardware.  All sessions and devices opened from
//! one [`FakeBackend`] share a single state cell, so a test can inspect what
//! the application did to the "hardware" after the fact.

use std::sync::{Arc, Mutex};

use cam_core::{
    CapabilityTier, CaptureFormat, CaptureOutcome, CapturePayload, CaptureRequest,
    DeviceDescriptor, DeviceId, Position,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    AuthorizationStatus, BackendError, CameraBackend, CameraDevice, CaptureSession,
    PointOfInterest,
};

/// Scripted behaviour knobs, all off by default.
#[derive(Debug)]
struct FakeScript {
    authorization_denied: bool,
    fail_input_attach: bool,
    fail_output_attach: bool,
    fail_start: bool,
    fail_submit: bool,
    fail_device_ops: bool,
    deliver_failed_outcome: bool,
    /// Number of `raw_formats()` queries that return an empty list before the
    /// real list becomes visible.  Models the transient empty window devices
    /// exhibit right after reconfiguration.
    transient_empty_raw_queries: u32,
    raw_formats: Vec<u32>,
    supports_high_resolution: bool,
    supports_capture_optimizations: bool,
}

impl Default for FakeScript {
    fn default() -> Self {
        Self {
            authorization_denied: false,
            fail_input_attach: false,
            fail_output_attach: false,
            fail_start: false,
            fail_submit: false,
            fail_device_ops: false,
            deliver_failed_outcome: false,
            transient_empty_raw_queries: 0,
            // Bayer RGGB, the usual single RAW format.
            raw_formats: vec![0x7267_6762],
            supports_high_resolution: true,
            supports_capture_optimizations: true,
        }
    }
}

/// Shared state cell: discovery snapshot, session state, and call counters.
#[derive(Debug, Default)]
struct FakeState {
    devices: Vec<DeviceDescriptor>,
    script: FakeScript,
    // Session-resource state.
    configuring: bool,
    running: bool,
    input: Option<DeviceId>,
    output_count: usize,
    // Device state as last applied by the application.
    device_zoom: f64,
    torch_on: bool,
    // Call counters for assertions.
    start_calls: u32,
    stop_calls: u32,
    attach_input_calls: u32,
    preset_applies: u32,
    auto_mode_asserts: u32,
    focus_calls: u32,
    submitted: Vec<CaptureRequest>,
}

/// A fake implementation of [`CameraBackend`] with scriptable behaviour.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Creates a fake backend with the given discovery snapshot.
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        let state = FakeState {
            devices,
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Creates a fake backend with the usual phone camera pair: a back
    /// triple module and a front wide camera.
    pub fn with_default_devices() -> Self {
        Self::new(vec![Self::back_triple(), Self::front_wide()])
    }

    /// Descriptor for a back triple camera: optical tiers
    /// `[0.5, 1.0, 2.0, 3.0]`, max zoom 15.0.
    pub fn back_triple() -> DeviceDescriptor {
        DeviceDescriptor {
            id: Uuid::new_v4(),
            name: "Back Triple Camera".to_string(),
            position: Position::Back,
            tier: CapabilityTier::WideTeleUltra,
            optical_zoom_tiers: vec![0.5, 1.0, 2.0, 3.0],
            max_zoom_factor: 15.0,
            connected: true,
        }
    }

    /// Descriptor for a front wide-only camera.
    pub fn front_wide() -> DeviceDescriptor {
        DeviceDescriptor {
            id: Uuid::new_v4(),
            name: "Front Camera".to_string(),
            position: Position::Front,
            tier: CapabilityTier::Wide,
            optical_zoom_tiers: vec![],
            max_zoom_factor: 8.0,
            connected: true,
        }
    }

    // ── Scripting ─────────────────────────────────────────────────────────────

    pub fn deny_authorization(&self) {
        self.lock().script.authorization_denied = true;
    }

    pub fn fail_input_attach(&self, fail: bool) {
        self.lock().script.fail_input_attach = fail;
    }

    pub fn fail_output_attach(&self, fail: bool) {
        self.lock().script.fail_output_attach = fail;
    }

    pub fn fail_start(&self, fail: bool) {
        self.lock().script.fail_start = fail;
    }

    pub fn fail_submit(&self, fail: bool) {
        self.lock().script.fail_submit = fail;
    }

    pub fn fail_device_ops(&self, fail: bool) {
        self.lock().script.fail_device_ops = fail;
    }

    pub fn deliver_failed_outcome(&self, fail: bool) {
        self.lock().script.deliver_failed_outcome = fail;
    }

    pub fn set_raw_formats(&self, formats: Vec<u32>) {
        self.lock().script.raw_formats = formats;
    }

    pub fn set_transient_empty_raw_queries(&self, count: u32) {
        self.lock().script.transient_empty_raw_queries = count;
    }

    pub fn set_supports_high_resolution(&self, supported: bool) {
        self.lock().script.supports_high_resolution = supported;
    }

    pub fn set_supports_capture_optimizations(&self, supported: bool) {
        self.lock().script.supports_capture_optimizations = supported;
    }

    /// Flips the connectivity flag of a discovered device, as if the
    /// platform reported a disconnect or reconnect.
    pub fn set_device_connected(&self, id: DeviceId, connected: bool) {
        let mut state = self.lock();
        if let Some(device) = state.devices.iter_mut().find(|d| d.id == id) {
            device.connected = connected;
        }
    }

    /// Forces the session-resource running flag, simulating the resource
    /// dying underneath the application (the "black preview" condition).
    pub fn force_session_running(&self, running: bool) {
        self.lock().running = running;
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    pub fn input_device(&self) -> Option<DeviceId> {
        self.lock().input
    }

    pub fn output_count(&self) -> usize {
        self.lock().output_count
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn start_calls(&self) -> u32 {
        self.lock().start_calls
    }

    pub fn stop_calls(&self) -> u32 {
        self.lock().stop_calls
    }

    pub fn attach_input_calls(&self) -> u32 {
        self.lock().attach_input_calls
    }

    pub fn preset_applies(&self) -> u32 {
        self.lock().preset_applies
    }

    pub fn auto_mode_asserts(&self) -> u32 {
        self.lock().auto_mode_asserts
    }

    pub fn focus_calls(&self) -> u32 {
        self.lock().focus_calls
    }

    pub fn device_zoom(&self) -> f64 {
        self.lock().device_zoom
    }

    pub fn torch_on(&self) -> bool {
        self.lock().torch_on
    }

    pub fn submitted_requests(&self) -> Vec<CaptureRequest> {
        self.lock().submitted.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl CameraBackend for FakeBackend {
    fn authorization(&self) -> AuthorizationStatus {
        if self.lock().script.authorization_denied {
            AuthorizationStatus::Denied
        } else {
            AuthorizationStatus::Granted
        }
    }

    fn discover_devices(&self) -> Vec<DeviceDescriptor> {
        self.lock().devices.clone()
    }

    fn open_device(&self, id: DeviceId) -> Result<Box<dyn CameraDevice>, BackendError> {
        let state = self.lock();
        let descriptor = state
            .devices
            .iter()
            .find(|d| d.id == id && d.connected)
            .cloned()
            .ok_or(BackendError::DeviceUnavailable(id))?;
        drop(state);
        Ok(Box::new(FakeDevice {
            descriptor,
            state: Arc::clone(&self.state),
        }))
    }

    fn make_session(
        &self,
        results: mpsc::UnboundedSender<CaptureOutcome>,
    ) -> Box<dyn CaptureSession> {
        Box::new(FakeSession {
            state: Arc::clone(&self.state),
            results,
        })
    }
}

/// Fake device handle sharing the backend's state cell.
struct FakeDevice {
    descriptor: DeviceDescriptor,
    state: Arc<Mutex<FakeState>>,
}

impl FakeDevice {
    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("lock poisoned")
    }

    fn check_device_ops(&self) -> Result<(), BackendError> {
        if self.lock().script.fail_device_ops {
            Err(BackendError::DeviceOp("simulated device failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl CameraDevice for FakeDevice {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn is_connected(&self) -> bool {
        self.lock()
            .devices
            .iter()
            .find(|d| d.id == self.descriptor.id)
            .map(|d| d.connected)
            .unwrap_or(false)
    }

    fn set_continuous_auto_modes(&mut self) -> Result<(), BackendError> {
        self.check_device_ops()?;
        self.lock().auto_mode_asserts += 1;
        Ok(())
    }

    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), BackendError> {
        self.check_device_ops()?;
        self.lock().device_zoom = factor;
        Ok(())
    }

    fn set_torch(&mut self, on: bool) -> Result<(), BackendError> {
        self.check_device_ops()?;
        self.lock().torch_on = on;
        Ok(())
    }

    fn focus_and_expose(&mut self, _point: PointOfInterest) -> Result<(), BackendError> {
        self.check_device_ops()?;
        self.lock().focus_calls += 1;
        Ok(())
    }
}

/// Fake session resource sharing the backend's state cell.
struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    results: mpsc::UnboundedSender<CaptureOutcome>,
}

impl FakeSession {
    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl CaptureSession for FakeSession {
    fn begin_configuration(&mut self) {
        self.lock().configuring = true;
    }

    fn commit_configuration(&mut self) {
        self.lock().configuring = false;
    }

    fn attach_input(&mut self, device: DeviceId) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.script.fail_input_attach {
            return Err(BackendError::InputRejected(
                "simulated input rejection".to_string(),
            ));
        }
        if state.input.is_some() {
            return Err(BackendError::InputRejected(
                "an input is already attached".to_string(),
            ));
        }
        state.input = Some(device);
        state.attach_input_calls += 1;
        Ok(())
    }

    fn detach_input(&mut self) {
        self.lock().input = None;
    }

    fn attach_photo_output(&mut self) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.script.fail_output_attach {
            return Err(BackendError::OutputRejected(
                "simulated output rejection".to_string(),
            ));
        }
        state.output_count += 1;
        Ok(())
    }

    fn remove_all_io(&mut self) {
        let mut state = self.lock();
        state.input = None;
        state.output_count = 0;
    }

    fn input_device(&self) -> Option<DeviceId> {
        self.lock().input
    }

    fn output_count(&self) -> usize {
        self.lock().output_count
    }

    fn enable_capture_optimizations(&mut self) -> bool {
        self.lock().script.supports_capture_optimizations
    }

    fn apply_quality_preset(&mut self) {
        self.lock().preset_applies += 1;
    }

    fn start(&mut self) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.script.fail_start {
            return Err(BackendError::StartFailed(
                "simulated start failure".to_string(),
            ));
        }
        state.running = true;
        state.start_calls += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.running = false;
        state.stop_calls += 1;
    }

    fn is_running(&self) -> bool {
        self.lock().running
    }

    fn raw_formats(&self) -> Vec<u32> {
        let mut state = self.lock();
        if state.script.transient_empty_raw_queries > 0 {
            state.script.transient_empty_raw_queries -= 1;
            return Vec::new();
        }
        state.script.raw_formats.clone()
    }

    fn supports_high_resolution(&self) -> bool {
        self.lock().script.supports_high_resolution
    }

    fn submit_photo(&mut self, request: CaptureRequest) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.script.fail_submit {
            return Err(BackendError::SubmitRejected(
                "simulated submission rejection".to_string(),
            ));
        }
        let outcome = if state.script.deliver_failed_outcome {
            CaptureOutcome::Failed {
                request_id: request.id,
                message: "simulated capture failure".to_string(),
            }
        } else {
            let is_raw = request.format.is_raw();
            let bytes = match request.format {
                CaptureFormat::Raw { .. } => vec![0xAB; 2048],
                CaptureFormat::Compressed => vec![0xCD; 512],
            };
            CaptureOutcome::Completed {
                request_id: request.id,
                payload: CapturePayload { bytes, is_raw },
            }
        };
        state.submitted.push(request);
        drop(state);
        // The receiver side may already be gone in unit tests; that is fine.
        let _ = self.results.send(outcome);
        Ok(())
    }
}
