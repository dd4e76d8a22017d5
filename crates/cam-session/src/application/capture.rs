//! CaptureCoordinator: per-shutter-press format negotiation and submission.
//!
//! Each shutter press negotiates RAW vs compressed against what the photo
//! output offers *right now* (the offer can be transiently empty after a
//! reconfiguration), builds a typed [`CaptureRequest`], and submits it
//! through the serialized context.  Results arrive asynchronously on the
//! channel the session was created with; [`spawn_result_router`] drains that
//! channel and hands completed payloads to a [`PhotoStore`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cam_core::{CaptureOutcome, CaptureRequest};

use crate::application::transaction::SessionTransactionManager;

/// Error type for capture submission.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The session has no photo output attached; nothing to capture with.
    #[error("no photo output attached")]
    NoOutput,
    /// The session rejected the submission (busy, torn down mid-flight).
    #[error("photo submission rejected: {0}")]
    Submit(String),
}

/// Destination for completed capture payloads.
///
/// Production wires a media-library writer here; tests use an in-memory
/// recorder.  Storage failures are final: the payload is dropped with a log
/// line, never re-captured.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, is_raw: bool, size_bytes: usize) -> Result<(), String>;
}

/// Negotiates and submits photo capture requests.
pub struct CaptureCoordinator {
    txn: Arc<SessionTransactionManager>,
}

impl CaptureCoordinator {
    pub fn new(txn: Arc<SessionTransactionManager>) -> Self {
        Self { txn }
    }

    /// Handles one shutter press.
    ///
    /// Prefers RAW when the output offers a RAW pixel format.  An empty
    /// offer gets one retry after re-applying the session quality preset,
    /// which refreshes the output's format list on platforms where the list
    /// is transiently empty after reconfiguration.  Still empty means the
    /// device genuinely lacks RAW and the request falls back to compressed.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoOutput`] if no photo output is attached;
    /// [`CaptureError::Submit`] if the session rejects the submission.
    pub async fn capture(&self) -> Result<CaptureRequest, CaptureError> {
        self.txn
            .run_exclusive(|state| {
                if state.session.output_count() == 0 {
                    return Err(CaptureError::NoOutput);
                }
                // Re-assert continuous-auto modes so a capture after a device
                // switch never runs with stale settings.  Absence of a device
                // or a transient device error does not block the capture.
                if let Some(device) = state.device.as_mut() {
                    if let Err(e) = device.set_continuous_auto_modes() {
                        warn!(error = %e, "could not re-assert auto modes before capture");
                    }
                }

                let mut formats = state.session.raw_formats();
                if formats.is_empty() {
                    debug!("RAW format list empty; re-applying preset and retrying once");
                    state.session.apply_quality_preset();
                    formats = state.session.raw_formats();
                }

                let high_resolution = state.session.supports_high_resolution();
                let request = match formats.first() {
                    Some(&pixel_format) => CaptureRequest::raw(pixel_format, high_resolution),
                    None => {
                        info!("no RAW format available; falling back to compressed");
                        CaptureRequest::compressed(high_resolution)
                    }
                };

                state
                    .session
                    .submit_photo(request.clone())
                    .map_err(|e| CaptureError::Submit(e.to_string()))?;
                debug!(
                    request_id = %request.id,
                    raw = request.format.is_raw(),
                    high_resolution,
                    "capture request submitted"
                );
                Ok(request)
            })
            .await
    }
}

/// Spawns the task that routes asynchronous capture outcomes to the store.
///
/// Runs until the results channel closes (the session resource was dropped).
/// A storage failure drops that payload with a log line; the next outcome is
/// processed normally.
pub fn spawn_result_router(
    mut results: mpsc::UnboundedReceiver<CaptureOutcome>,
    store: Arc<dyn PhotoStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outcome) = results.recv().await {
            match outcome {
                CaptureOutcome::Completed {
                    request_id,
                    payload,
                } => {
                    let size = payload.size_bytes();
                    info!(%request_id, raw = payload.is_raw, size_bytes = size, "capture completed");
                    if let Err(e) = store.store(payload.bytes, payload.is_raw, size).await {
                        warn!(%request_id, error = %e, "photo store failed; payload dropped");
                    }
                }
                CaptureOutcome::Failed {
                    request_id,
                    message,
                } => {
                    warn!(%request_id, %message, "capture failed");
                }
            }
        }
        debug!("capture results channel closed; router exiting");
    })
}
