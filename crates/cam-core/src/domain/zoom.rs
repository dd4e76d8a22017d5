//! Zoom computation: clamping and optical/digital classification.
//!
//! Magnification up to the active device's highest physical lens factor is
//! *optical*; anything beyond it is *digital* (crop + upscale) and the UI
//! shows an indicator for it.  The math here is pure — applying the factor
//! to the device is the application layer's job.

use serde::{Deserialize, Serialize};

use super::device::DeviceDescriptor;

/// Result of a zoom request after clamping and classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomDecision {
    /// The factor actually applied, clamped into `[0, max_zoom]`.
    pub applied: f64,
    /// `true` iff `applied` exceeds the device's optical maximum.
    pub is_digital: bool,
}

/// Current zoom state for the active device.
///
/// Recomputed whenever the active device changes; published to the UI after
/// every mutation so the digital-zoom indicator tracks the authoritative
/// session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    /// The factor currently applied.
    pub factor: f64,
    /// Highest magnification achievable optically on the active device.
    pub max_optical: f64,
    /// Highest total (optical + digital) factor the device accepts.
    pub max_zoom: f64,
    /// Whether the current factor is in the digital range.
    pub digital_active: bool,
    /// Selectable optical tiers, for the UI's zoom-level buttons.
    pub available_levels: Vec<f64>,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            factor: 1.0,
            max_optical: 1.0,
            max_zoom: 1.0,
            digital_active: false,
            available_levels: vec![1.0],
        }
    }
}

impl ZoomState {
    /// Builds the initial zoom state for a freshly attached device.
    ///
    /// The factor resets to 1.0× on every device change so a digital zoom
    /// level from the previous camera never silently carries over.
    pub fn for_device(device: &DeviceDescriptor) -> Self {
        let levels = if device.optical_zoom_tiers.is_empty() {
            vec![1.0]
        } else {
            device.optical_zoom_tiers.clone()
        };
        Self {
            factor: 1.0,
            max_optical: device.max_optical_zoom(),
            max_zoom: device.max_zoom_factor,
            digital_active: false,
            available_levels: levels,
        }
    }

    /// Clamps `requested` into the device range, classifies it, and records
    /// the result.
    ///
    /// A request is never dropped: out-of-range values are clamped and the
    /// clamped value is what gets applied.
    pub fn apply(&mut self, requested: f64) -> ZoomDecision {
        let applied = requested.clamp(0.0, self.max_zoom);
        let is_digital = applied > self.max_optical;
        self.factor = applied;
        self.digital_active = is_digital;
        ZoomDecision { applied, is_digital }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::{CapabilityTier, Position};
    use uuid::Uuid;

    /// Device matching the reference scenario: optical tiers
    /// `[0.5, 1.0, 2.0, 3.0]`, max total zoom 15.0.
    fn triple_camera() -> DeviceDescriptor {
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

    #[test]
    fn test_zoom_within_optical_range_is_not_digital() {
        let mut state = ZoomState::for_device(&triple_camera());
        let decision = state.apply(1.0);
        assert!((decision.applied - 1.0).abs() < f64::EPSILON);
        assert!(!decision.is_digital);
    }

    #[test]
    fn test_zoom_beyond_optical_max_is_digital() {
        let mut state = ZoomState::for_device(&triple_camera());
        let decision = state.apply(5.0);
        assert!((decision.applied - 5.0).abs() < f64::EPSILON);
        assert!(decision.is_digital);
    }

    #[test]
    fn test_zoom_above_max_clamps_to_max_and_is_digital() {
        let mut state = ZoomState::for_device(&triple_camera());
        let decision = state.apply(20.0);
        assert!((decision.applied - 15.0).abs() < f64::EPSILON);
        assert!(decision.is_digital);
    }

    #[test]
    fn test_zoom_at_exact_optical_max_is_not_digital() {
        let mut state = ZoomState::for_device(&triple_camera());
        let decision = state.apply(3.0);
        assert!(!decision.is_digital);
    }

    #[test]
    fn test_negative_zoom_clamps_to_zero() {
        let mut state = ZoomState::for_device(&triple_camera());
        let decision = state.apply(-2.0);
        assert!(decision.applied.abs() < f64::EPSILON);
        assert!(!decision.is_digital);
    }

    #[test]
    fn test_apply_updates_state_fields() {
        let mut state = ZoomState::for_device(&triple_camera());
        state.apply(7.5);
        assert!((state.factor - 7.5).abs() < f64::EPSILON);
        assert!(state.digital_active);
    }

    #[test]
    fn test_for_device_resets_factor_to_one() {
        let state = ZoomState::for_device(&triple_camera());
        assert!((state.factor - 1.0).abs() < f64::EPSILON);
        assert!(!state.digital_active);
        assert_eq!(state.available_levels, vec![0.5, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_default_state_is_unit_zoom() {
        let state = ZoomState::default();
        assert!((state.factor - 1.0).abs() < f64::EPSILON);
        assert!((state.max_zoom - 1.0).abs() < f64::EPSILON);
    }
}
