//! # atlas-core: Foundational Types for the Event Lifecycle Engine
//!
//! Every other crate in the workspace depends on `atlas-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `EventId` is validated at construction and on
//!    deserialization. No bare strings travel between the engine and its
//!    collaborators.
//!
//! 2. **UTC-only timestamps.** `Timestamp` normalizes every instant to UTC
//!    with seconds precision, whatever offset the host application stored.
//!
//! 3. **Injectable time.** Nothing in the engine calls `Utc::now()` directly.
//!    Time-based rules read the `Clock` they were constructed with, so tests
//!    pin the clock and walk it forward.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `atlas-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod error;
pub mod identity;
pub mod temporal;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AtlasError;
pub use identity::EventId;
pub use temporal::Timestamp;
