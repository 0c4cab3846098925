//! Domain model for birthday records.
//!
//! # Responsibility
//! - Define the canonical record shared by storage, resolution and callers.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Only lunar records may carry the leap month flag.

pub mod birthday;
