//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the relay:
//! - The tracking event model delivered by the event source
//! - Whitelist admission rules
//! - Translation of admitted events into dispatch records
//!
//! All types in this layer are pure and easily testable.

pub mod event;
pub mod record;
pub mod whitelist;
