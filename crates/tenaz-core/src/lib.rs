//! Tenaz Core - Domain model and business rules
//!
//! This crate contains the shared vocabulary of the tool:
//! - **Object kinds** - the nine tenant object kinds and their per-kind tables
//! - **Raw documents** - helpers over untyped backend response documents
//! - **Scope paths** - resource-management hierarchy path helpers
//! - **List diff** - the added/removed/same comparison used by reconciliation
//! - **Errors** - the error taxonomy shared by every crate
//! - **Credentials** - login configuration from environment and file
//!
//! The domain module is pure: it performs no I/O beyond what the
//! configuration loader needs and has no knowledge of HTTP or caching.

pub mod config;
pub mod domain;

pub use config::{Credentials, LoginMethod};
pub use domain::errors::{Error, Result};
pub use domain::kind::ObjectKind;
