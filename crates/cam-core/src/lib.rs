//! # cam-core
//!
//! Shared domain model for CamKit: capture device descriptors and the
//! registry that resolves them, zoom computation, the session phase machine,
//! the interruption taxonomy with its recovery policy, and the typed capture
//! request/payload structs.
//!
//! This crate is used by the session application crate and by anything that
//! needs to reason about camera state without touching a real camera.
//! It has zero dependencies on OS APIs, UI frameworks, or capture hardware.
//!
//! # Architecture overview (for beginners)
//!
//! CamKit is a camera capture application core.  The hard part of such an app
//! is not drawing the preview — it is keeping the capture *session* (the live
//! aggregate of one device input and one or more outputs) consistent while
//! the user switches cameras, zooms, presses the shutter, and the OS
//! interrupts capture at will.
//!
//! This crate (`cam-core`) is the pure foundation.  It defines:
//!
//! - **`domain::device`** – Which cameras exist: logical position
//!   (front/back), capability tier (how many physical lenses), and the pure
//!   lookup that picks the best device for a position.
//!
//! - **`domain::zoom`** – The zoom math: clamping a requested factor to the
//!   device limits and classifying it as optical or digital.
//!
//! - **`domain::phase`** – The session lifecycle phases and which transitions
//!   between them are legal.
//!
//! - **`domain::interruption`** – Why the OS suspended capture, and what the
//!   controller should do about it (the recovery policy).
//!
//! - **`domain::capture`** – Typed photo request and payload structs handed
//!   between the coordinator, the backend, and the persistence collaborator.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `cam_core::DeviceRegistry` instead of `cam_core::domain::device::DeviceRegistry`.
pub use domain::capture::{CaptureFormat, CaptureOutcome, CapturePayload, CaptureRequest, FlashMode};
pub use domain::device::{
    CapabilityTier, DeviceDescriptor, DeviceId, DeviceRegistry, Position, RegistryError,
};
pub use domain::interruption::{InterruptionEvent, InterruptionReason, RecoveryAction, RecoveryPolicy};
pub use domain::phase::SessionPhase;
pub use domain::zoom::{ZoomDecision, ZoomState};
