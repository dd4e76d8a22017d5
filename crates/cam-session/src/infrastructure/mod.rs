//! Infrastructure layer for the capture-session application.
//!
//! Contains platform-facing adapters: the camera backend traits (with the
//! in-memory fake used by tests and the headless demo), file-system
//! configuration storage, and the UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `cam_core`, but MUST NOT be imported by the domain layer.

pub mod backend;
pub mod storage;
pub mod ui_bridge;
