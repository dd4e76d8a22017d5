//! Typed photo capture request and payload structs.
//!
//! One `CaptureRequest` is created per shutter press and discarded after the
//! resulting payload has been handed off.  The request id exists purely for
//! log correlation between submission and asynchronous result delivery.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format negotiated for a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    /// Unprocessed sensor data in the given pixel layout.
    Raw {
        /// Platform pixel-format identifier (FourCC-style code).
        pixel_format: u32,
    },
    /// Compressed fallback (HEIC/JPEG, whatever the platform default is).
    Compressed,
}

impl CaptureFormat {
    pub fn is_raw(self) -> bool {
        matches!(self, CaptureFormat::Raw { .. })
    }
}

/// Flash policy for a capture request.
///
/// This system never fires the flash; the enum exists so the request struct
/// states the policy explicitly rather than relying on a platform default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashMode {
    #[default]
    Off,
}

/// A single photo capture request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Correlation id, unique per shutter press.
    pub id: Uuid,
    pub format: CaptureFormat,
    pub flash: FlashMode,
    /// High-resolution capture; enabled only when the output supports it.
    pub high_resolution: bool,
}

impl CaptureRequest {
    /// Builds a RAW request for the given pixel format.
    pub fn raw(pixel_format: u32, high_resolution: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            format: CaptureFormat::Raw { pixel_format },
            flash: FlashMode::Off,
            high_resolution,
        }
    }

    /// Builds a compressed fallback request.
    pub fn compressed(high_resolution: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            format: CaptureFormat::Compressed,
            flash: FlashMode::Off,
            high_resolution,
        }
    }
}

/// The bytes produced by a completed capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturePayload {
    pub bytes: Vec<u8>,
    pub is_raw: bool,
}

impl CapturePayload {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Asynchronous result of a submitted capture request.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The platform produced a photo.
    Completed {
        request_id: Uuid,
        payload: CapturePayload,
    },
    /// The platform rejected or failed the request.  Surfaced as an explicit
    /// failure; never retried automatically.
    Failed { request_id: Uuid, message: String },
}

impl CaptureOutcome {
    pub fn request_id(&self) -> Uuid {
        match self {
            CaptureOutcome::Completed { request_id, .. } => *request_id,
            CaptureOutcome::Failed { request_id, .. } => *request_id,
        }
    }
}
