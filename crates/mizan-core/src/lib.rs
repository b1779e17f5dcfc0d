//! Mizan Core - domain model and ports
//!
//! The hexagonal core of Mizan, a Zakat ledger with local-first cloud
//! synchronization:
//!
//! - [`domain`] - ledger model, snapshots, lenient import, sync-state values
//! - [`ports`] - interfaces implemented by the adapter crates
//! - [`config`] - typed YAML configuration
//!
//! This crate performs no I/O; storage, HTTP and scheduling live behind the
//! port traits in the adapter crates.

pub mod config;
pub mod domain;
pub mod ports;
