//! Capture device domain entities and the pure device registry.
//!
//! A `DeviceDescriptor` describes one physical camera module: where it faces
//! (front/back), how many physical lenses back it (capability tier), its
//! optical zoom tiers, and whether the platform currently reports it as
//! connected.  The `DeviceRegistry` is a pure lookup over a discovery
//! snapshot — it holds no mutable state and never touches hardware.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a capture device, derived from UUID v4.
pub type DeviceId = Uuid;

/// Logical position of a capture device relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Faces the user (selfie camera).
    Front,
    /// Faces away from the user (main camera).
    Back,
}

impl Position {
    /// Returns the opposite logical position.
    ///
    /// Used by the camera-switch protocol, which toggles between front and
    /// back rather than selecting an arbitrary device.
    pub fn toggled(self) -> Self {
        match self {
            Position::Front => Position::Back,
            Position::Back => Position::Front,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Front => write!(f, "front"),
            Position::Back => write!(f, "back"),
        }
    }
}

/// Capability tier of a device: how many physically distinct lenses it
/// aggregates.  Higher tiers expose more optical zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTier {
    /// Single wide-angle lens.  Optical zoom is fixed at 1.0×.
    Wide,
    /// Wide + telephoto pair.
    WideTele,
    /// Wide + telephoto + ultra-wide triple module.
    WideTeleUltra,
}

/// Errors that can occur when resolving a device.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// No connected device exists for the requested logical position.
    #[error("no capture device available for position {0}")]
    NoDeviceAvailable(Position),
}

/// Description of one physical capture device as reported by discovery.
///
/// The `connected` flag is owned by the platform and may change
/// asynchronously; the core treats it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Unique identifier assigned at discovery time.
    pub id: DeviceId,
    /// Human-readable name (e.g. `"Back Triple Camera"`).
    pub name: String,
    /// Logical position.
    pub position: Position,
    /// Lens capability tier.
    pub tier: CapabilityTier,
    /// Selectable optical magnifications, ascending (e.g. `[0.5, 1.0, 3.0]`).
    /// May be empty for single-lens devices.
    pub optical_zoom_tiers: Vec<f64>,
    /// Maximum total zoom factor (optical + digital) the device accepts.
    pub max_zoom_factor: f64,
    /// Whether the platform currently reports the device as connected.
    pub connected: bool,
}

impl DeviceDescriptor {
    /// Returns the maximum magnification achievable without digital cropping.
    ///
    /// Wide-only devices are always 1.0×.  Multi-lens devices use the highest
    /// entry of their optical tier list; if the platform reported no tiers,
    /// a conservative per-tier default applies.
    pub fn max_optical_zoom(&self) -> f64 {
        if self.tier == CapabilityTier::Wide {
            return 1.0;
        }
        if self.optical_zoom_tiers.is_empty() {
            return match self.tier {
                CapabilityTier::Wide => 1.0,
                CapabilityTier::WideTele => 3.0,
                CapabilityTier::WideTeleUltra => 5.0,
            };
        }
        self.optical_zoom_tiers
            .iter()
            .copied()
            .fold(1.0_f64, f64::max)
    }
}

/// Pure lookup over a discovery snapshot of capture devices.
///
/// The registry never mutates; a new snapshot produces a new registry.
/// Resolution prefers the most capable connected device for a position, so a
/// phone with both a back wide camera and a back triple camera resolves the
/// triple module.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceRegistry {
    /// Builds a registry from a discovery snapshot.
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self { devices }
    }

    /// Returns all devices in the snapshot, connected or not.
    pub fn all(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Returns the descriptor for a specific device.
    pub fn get(&self, id: DeviceId) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Resolves the best connected device for a logical position.
    ///
    /// "Best" means the highest capability tier; ties resolve to the first
    /// discovered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoDeviceAvailable`] when no connected device
    /// exists for the position.
    pub fn resolve(&self, position: Position) -> Result<&DeviceDescriptor, RegistryError> {
        self.devices
            .iter()
            .filter(|d| d.position == position && d.connected)
            .max_by_key(|d| d.tier)
            .ok_or(RegistryError::NoDeviceAvailable(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_device(position: Position, tier: CapabilityTier, connected: bool) -> DeviceDescriptor {
        DeviceDescriptor {
            id: Uuid::new_v4(),
            name: format!("{position} {tier:?}"),
            position,
            tier,
            optical_zoom_tiers: match tier {
                CapabilityTier::Wide => vec![],
                CapabilityTier::WideTele => vec![1.0, 3.0],
                CapabilityTier::WideTeleUltra => vec![0.5, 1.0, 2.0, 3.0],
            },
            max_zoom_factor: 15.0,
            connected,
        }
    }

    #[test]
    fn test_resolve_returns_device_for_requested_position() {
        let registry = DeviceRegistry::new(vec![
            make_device(Position::Back, CapabilityTier::Wide, true),
            make_device(Position::Front, CapabilityTier::Wide, true),
        ]);
        let device = registry.resolve(Position::Front).unwrap();
        assert_eq!(device.position, Position::Front);
    }

    #[test]
    fn test_resolve_prefers_highest_capability_tier() {
        let registry = DeviceRegistry::new(vec![
            make_device(Position::Back, CapabilityTier::Wide, true),
            make_device(Position::Back, CapabilityTier::WideTeleUltra, true),
            make_device(Position::Back, CapabilityTier::WideTele, true),
        ]);
        let device = registry.resolve(Position::Back).unwrap();
        assert_eq!(device.tier, CapabilityTier::WideTeleUltra);
    }

    #[test]
    fn test_resolve_skips_disconnected_devices() {
        let registry = DeviceRegistry::new(vec![
            make_device(Position::Back, CapabilityTier::WideTeleUltra, false),
            make_device(Position::Back, CapabilityTier::Wide, true),
        ]);
        let device = registry.resolve(Position::Back).unwrap();
        assert_eq!(device.tier, CapabilityTier::Wide);
    }

    #[test]
    fn test_resolve_fails_when_no_device_for_position() {
        let registry = DeviceRegistry::new(vec![make_device(
            Position::Back,
            CapabilityTier::Wide,
            true,
        )]);
        let result = registry.resolve(Position::Front);
        assert_eq!(result, Err(RegistryError::NoDeviceAvailable(Position::Front)));
    }

    #[test]
    fn test_resolve_fails_on_empty_registry() {
        let registry = DeviceRegistry::default();
        assert!(registry.resolve(Position::Back).is_err());
    }

    #[test]
    fn test_toggled_flips_position() {
        assert_eq!(Position::Front.toggled(), Position::Back);
        assert_eq!(Position::Back.toggled(), Position::Front);
    }

    #[test]
    fn test_max_optical_zoom_is_one_for_wide_only() {
        let device = make_device(Position::Front, CapabilityTier::Wide, true);
        assert!((device.max_optical_zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_optical_zoom_uses_highest_tier_entry() {
        let device = make_device(Position::Back, CapabilityTier::WideTeleUltra, true);
        assert!((device.max_optical_zoom() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_optical_zoom_falls_back_on_empty_tier_list() {
        let mut device = make_device(Position::Back, CapabilityTier::WideTele, true);
        device.optical_zoom_tiers.clear();
        assert!((device.max_optical_zoom() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_get_finds_device_by_id() {
        let device = make_device(Position::Back, CapabilityTier::Wide, true);
        let id = device.id;
        let registry = DeviceRegistry::new(vec![device]);
        assert!(registry.get(id).is_some());
        assert!(registry.get(Uuid::new_v4()).is_none());
    }
}
