//! Integration tests for tenaz-tenant
//!
//! Uses wiremock to simulate the two backends and a temp directory for
//! the snapshot store, then verifies the end-to-end listing, traversal,
//! and lookup flows.

mod common;

mod test_directory_sync;
mod test_rbac;
