//! Domain entities for CamKit.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, camera frameworks, or UI toolkits.
//! - Can be compiled and tested on any platform without a camera attached.
//! - Defines the data types and operations that make the system uniquely what
//!   it is: in this case, the model of capture devices, zoom limits, session
//!   phases, and interruption recovery.
//!
//! Code in outer layers (infrastructure, application, UI) depends on the
//! domain, but the domain never depends on them.  This makes the domain easy
//! to unit-test in isolation.

pub mod capture;
pub mod device;
pub mod interruption;
pub mod phase;
pub mod zoom;
