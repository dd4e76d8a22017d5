//! Integration tests over the public `cam-core` API.
//!
//! These exercise the domain types the way the session crate uses them:
//! resolve a device from a discovery snapshot, derive zoom state from it,
//! and run zoom requests through clamping and classification.

use cam_core::{
    CapabilityTier, DeviceDescriptor, DeviceRegistry, InterruptionReason, Position,
    RecoveryAction, RecoveryPolicy, SessionPhase, ZoomState,
};
use uuid::Uuid;

fn back_triple() -> DeviceDescriptor {
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

fn front_wide() -> DeviceDescriptor {
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

/// Reference scenario from the zoom requirements: optical tiers
/// `[0.5, 1.0, 2.0, 3.0]`, max zoom 15.0.
#[test]
fn test_zoom_scenario_for_triple_camera() {
    let registry = DeviceRegistry::new(vec![back_triple(), front_wide()]);
    let device = registry.resolve(Position::Back).expect("back device");
    let mut zoom = ZoomState::for_device(device);

    let d = zoom.apply(5.0);
    assert!((d.applied - 5.0).abs() < f64::EPSILON);
    assert!(d.is_digital);

    let d = zoom.apply(20.0);
    assert!((d.applied - 15.0).abs() < f64::EPSILON);
    assert!(d.is_digital);

    let d = zoom.apply(1.0);
    assert!((d.applied - 1.0).abs() < f64::EPSILON);
    assert!(!d.is_digital);
}

/// Switching devices rebuilds zoom state: the front wide-only camera has an
/// optical ceiling of 1.0, so anything above it is digital.
#[test]
fn test_zoom_state_follows_device_switch() {
    let registry = DeviceRegistry::new(vec![back_triple(), front_wide()]);

    let back = registry.resolve(Position::Back).unwrap();
    let mut zoom = ZoomState::for_device(back);
    assert!(!zoom.apply(2.0).is_digital);

    let front = registry.resolve(Position::Front).unwrap();
    zoom = ZoomState::for_device(front);
    assert!((zoom.factor - 1.0).abs() < f64::EPSILON, "factor resets on switch");
    assert!(zoom.apply(2.0).is_digital);
}

/// An interruption episode with a bounded budget ends in `GiveUp`, and the
/// budget comes back once the session recovers.
#[test]
fn test_recovery_episode_is_bounded_and_resettable() {
    let mut policy = RecoveryPolicy::new(3);

    for _ in 0..3 {
        assert_eq!(
            policy.decide(InterruptionReason::DeviceInUseElsewhere),
            RecoveryAction::RestartAfterSettle
        );
    }
    assert_eq!(
        policy.decide(InterruptionReason::DeviceInUseElsewhere),
        RecoveryAction::GiveUp
    );

    policy.reset();
    assert_eq!(
        policy.decide(InterruptionReason::DeviceInUseElsewhere),
        RecoveryAction::RestartAfterSettle
    );
}

/// Phase machine sanity for the interruption round trip used by the
/// lifecycle controller.
#[test]
fn test_interruption_round_trip_phases() {
    assert!(SessionPhase::Running.can_transition(SessionPhase::Interrupted));
    assert!(SessionPhase::Interrupted.can_transition(SessionPhase::Running));
    assert!(SessionPhase::Interrupted.can_transition(SessionPhase::Configuring));
}
