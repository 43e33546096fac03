//! HTTP transport for the two backend APIs
//!
//! [`client::ApiClient`] issues typed requests against the directory/graph
//! API and the resource-management API, binding the right bearer token by
//! URL prefix and decoding the three response shapes the backends produce
//! (bare integer counts, JSON documents, empty bodies).
//!
//! [`delta::fetch_delta`] walks a server-side change stream to completion
//! and surfaces the continuation link for the next invocation.

pub mod client;
pub mod delta;
pub mod net;

pub use client::{ApiClient, ApiResponse, GRAPH_BASE_URL, MGMT_BASE_URL};
pub use delta::{fetch_delta, DeltaResult};
