//! Service-level integration tests for the Mamori core
//!
//! Drives the composition, lifecycle, duplication, and charm services
//! against the in-memory stores, covering the cross-service invariants:
//! layer contiguity, the background singleton, all-or-nothing reorder,
//! publish guards and idempotence, and duplication fidelity.

mod common;

mod charms;
mod duplication;
mod elements;
mod lifecycle;
