//! Resolution and verification pipeline.
//!
//! Turns a `CollaborativeStateMachineDecl` into a verified
//! `CollaborativeStateMachine`:
//!
//! 1. Machine names are indexed; duplicates are rejected.
//! 2. Each machine's ancestor chain is followed and its lineage is merged
//!    into a candidate (`merge`).
//! 3. Candidates are checked in a fixed order (`verify`).
//! 4. Verified candidates are resolved into the immutable graph, with
//!    action and guard references bound to the merged tables.
//!
//! The pipeline is synchronous and has no side effects beyond `tracing`
//! events, so running it twice on the same declarations gives equal graphs
//! or equal failures.

pub mod error;
pub mod machine;
mod merge;
pub mod options;
mod verify;

pub use error::{Message, VerificationError};
pub use machine::CollaborativeStateMachineBuilder;
pub use options::{BuildOptions, OptionsError, DEFAULT_MAX_INHERITANCE_DEPTH};
