//! Camera backend traits: the seam between the session core and the
//! platform capture framework.
//!
//! The production implementation wraps whatever the platform provides
//! (AVFoundation, Camera2, V4L2); tests and the headless demo use
//! [`fake::FakeBackend`].  Everything the lifecycle controller does to a real
//! camera goes through these traits, so the controller itself never links
//! against a camera framework.
//!
//! # Threading
//!
//! Trait methods are synchronous and may block briefly (`start`/`stop` on
//! real hardware take tens of milliseconds).  They are only ever called from
//! the serialized session context, which runs on the async runtime's worker
//! threads — never on a UI-affinity thread.
//!
//! Capture results are the exception: the platform delivers them on its own
//! callback thread, so [`CaptureSession::submit_photo`] takes effect
//! asynchronously and the outcome arrives on the channel handed to
//! [`CameraBackend::make_session`].  Nothing may touch session state from
//! that delivery context directly.

use cam_core::{CaptureOutcome, CaptureRequest, DeviceDescriptor, DeviceId};
use thiserror::Error;
use tokio::sync::mpsc;

pub mod fake;

/// Error type for raw backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("device {0} is not available")]
    DeviceUnavailable(DeviceId),
    #[error("session rejected input attachment: {0}")]
    InputRejected(String),
    #[error("session rejected output attachment: {0}")]
    OutputRejected(String),
    #[error("session failed to start: {0}")]
    StartFailed(String),
    #[error("photo submission rejected: {0}")]
    SubmitRejected(String),
    #[error("device operation failed: {0}")]
    DeviceOp(String),
}

/// Camera authorization state as reported by the platform.
///
/// On denial the core surfaces a permission error and performs no further
/// session configuration; it never polls for a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
}

/// A point of interest in normalized coordinates, `(0.0, 0.0)` top-left to
/// `(1.0, 1.0)` bottom-right, used for tap-to-focus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOfInterest {
    pub x: f64,
    pub y: f64,
}

impl PointOfInterest {
    /// Builds a point clamped into the normalized unit square.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// An open handle to one physical capture device.
///
/// Held by the lifecycle controller only while the corresponding input is
/// attached; dropped on every switch or reconfiguration.
pub trait CameraDevice: Send {
    /// Descriptor the device was opened from.
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Current connectivity as reported by the platform.  May flip to
    /// `false` asynchronously (cable pulled, external camera off).
    fn is_connected(&self) -> bool;

    /// Puts exposure, focus, and white balance into continuous-auto mode.
    ///
    /// Idempotent; re-asserted after every device switch and before every
    /// capture so settings never silently diverge across a device change.
    fn set_continuous_auto_modes(&mut self) -> Result<(), BackendError>;

    /// Applies a zoom factor already clamped into the device's range.
    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), BackendError>;

    /// Turns the torch on or off.
    fn set_torch(&mut self, on: bool) -> Result<(), BackendError>;

    /// Drives a one-shot focus + exposure routine at the given point.
    fn focus_and_expose(&mut self, point: PointOfInterest) -> Result<(), BackendError>;
}

/// The platform capture session resource.
///
/// Exclusively owned behind the transaction manager's lock; structural
/// mutation (attach/detach) is only legal between `begin_configuration` and
/// `commit_configuration`.
pub trait CaptureSession: Send {
    /// Opens a configuration bracket on the underlying resource.
    fn begin_configuration(&mut self);

    /// Closes the configuration bracket, applying queued changes atomically.
    fn commit_configuration(&mut self);

    /// Attaches the device as the session's single input.
    fn attach_input(&mut self, device: DeviceId) -> Result<(), BackendError>;

    /// Detaches the current input, if any.
    fn detach_input(&mut self);

    /// Attaches the photo capture output.
    fn attach_photo_output(&mut self) -> Result<(), BackendError>;

    /// Removes every attached input and output.
    fn remove_all_io(&mut self);

    /// The currently attached input device, if any.
    fn input_device(&self) -> Option<DeviceId>;

    /// Number of attached outputs.
    fn output_count(&self) -> usize;

    /// Best-effort output-level capture optimizations (speed/quality
    /// prioritization).  Returns whether the capability was supported;
    /// absence of support is not an error.
    fn enable_capture_optimizations(&mut self) -> bool;

    /// Re-applies the session-wide quality preset.
    fn apply_quality_preset(&mut self);

    /// Starts frame delivery.  Blocking on real hardware.
    fn start(&mut self) -> Result<(), BackendError>;

    /// Stops frame delivery.  Stopping a stopped session is a no-op.
    fn stop(&mut self);

    /// Whether the resource currently reports itself as running.
    fn is_running(&self) -> bool;

    /// RAW pixel formats the photo output currently offers.  May be
    /// transiently empty right after reconfiguration.
    fn raw_formats(&self) -> Vec<u32>;

    /// Whether the photo output supports high-resolution capture.
    fn supports_high_resolution(&self) -> bool;

    /// Submits a photo request.  The outcome arrives asynchronously on the
    /// results channel passed to [`CameraBackend::make_session`].
    fn submit_photo(&mut self, request: CaptureRequest) -> Result<(), BackendError>;
}

/// Entry point to the platform capture stack.
pub trait CameraBackend: Send + Sync {
    /// Current camera authorization state.
    fn authorization(&self) -> AuthorizationStatus;

    /// Snapshot of the devices the platform currently knows about.
    fn discover_devices(&self) -> Vec<DeviceDescriptor>;

    /// Opens a handle to a discovered device.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::DeviceUnavailable`] if the device is unknown
    /// or disconnected.
    fn open_device(&self, id: DeviceId) -> Result<Box<dyn CameraDevice>, BackendError>;

    /// Creates the capture session resource.  Capture outcomes for photos
    /// submitted through the session are delivered on `results`.
    fn make_session(
        &self,
        results: mpsc::UnboundedSender<CaptureOutcome>,
    ) -> Box<dyn CaptureSession>;
}
