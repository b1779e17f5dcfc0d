//! Integration test entry point for the Drive adapter
//!
//! Compiles the shared wiremock helpers and the per-operation test modules
//! into a single test binary.

mod common;
mod test_find;
mod test_transfer;
