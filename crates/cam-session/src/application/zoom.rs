//! ZoomController: applies zoom requests through the serialized context.
//!
//! The pure clamp/classify math lives in `cam_core::ZoomState`; this
//! controller is the thin application shim that pushes the applied factor to
//! the active device and keeps the authoritative state consistent when the
//! device rejects it.

use std::sync::Arc;

use tracing::{debug, warn};

use cam_core::ZoomDecision;

use crate::application::transaction::SessionTransactionManager;

/// Applies zoom requests to the active device.
pub struct ZoomController {
    txn: Arc<SessionTransactionManager>,
}

impl ZoomController {
    pub fn new(txn: Arc<SessionTransactionManager>) -> Self {
        Self { txn }
    }

    /// Clamps `requested` into the device range, pushes it to the device,
    /// and returns the applied factor plus the digital-zoom flag.
    ///
    /// If the device rejects the factor, or no device is attached, the
    /// previous zoom state is kept and the returned decision reflects it.
    pub async fn set_zoom(&self, requested: f64) -> ZoomDecision {
        self.txn
            .run_exclusive(move |state| {
                let mut next = state.zoom.clone();
                let decision = next.apply(requested);
                let Some(device) = state.device.as_mut() else {
                    debug!(requested, "zoom ignored: no active device");
                    return ZoomDecision {
                        applied: state.zoom.factor,
                        is_digital: state.zoom.digital_active,
                    };
                };
                match device.set_zoom_factor(decision.applied) {
                    Ok(()) => {
                        state.zoom = next;
                        state.publish();
                        debug!(
                            requested,
                            applied = decision.applied,
                            digital = decision.is_digital,
                            "zoom applied"
                        );
                        decision
                    }
                    Err(e) => {
                        warn!(requested, error = %e, "device rejected zoom; keeping previous factor");
                        ZoomDecision {
                            applied: state.zoom.factor,
                            is_digital: state.zoom.digital_active,
                        }
                    }
                }
            })
            .await
    }

    /// The current zoom factor from the authoritative state.
    pub async fn current_factor(&self) -> f64 {
        self.txn.run_exclusive(|state| state.zoom.factor).await
    }
}
