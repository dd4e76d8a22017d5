//! Application layer for the capture-session core.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (camera hardware, storage).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "switch to
//!   the front camera without tearing the session").
//! - **Depend on abstractions** (the backend traits) rather than a concrete
//!   camera framework, so tests can run against the in-memory fake.
//! - **Serialize** every mutation of the session resource through one
//!   exclusive execution context.
//!
//! # Sub-modules
//!
//! - **`transaction`** – The serialized session state and the begin/commit
//!   transaction bracket that guards structural mutation.
//!
//! - **`lifecycle`** – The session lifecycle controller: configure, start,
//!   stop, device switching, interruption recovery, and the health check.
//!   This is the heart of the crate.
//!
//! - **`zoom`** – Applies clamped zoom factors to the active device and
//!   publishes the digital-zoom indicator state.
//!
//! - **`capture`** – Negotiates RAW vs. compressed capture, submits photo
//!   requests, and routes asynchronous results to the persistence
//!   collaborator.
//!
//! - **`events`** – Converts platform callbacks (interruptions, lifecycle
//!   notifications) into an inbound event channel consumed on the serialized
//!   context.

pub mod capture;
pub mod events;
pub mod lifecycle;
pub mod transaction;
pub mod zoom;
