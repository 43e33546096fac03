//! Token acquisition for the two backend APIs
//!
//! The directory/graph API and the resource-management API each require
//! their own access token; the identity platform refuses a shared token
//! across resources. This crate obtains both through a silent-then-fresh
//! strategy backed by an on-disk token cache:
//!
//! 1. An unexpired cached token is served as-is.
//! 2. An expired cached token with a refresh token is refreshed.
//! 3. Otherwise a fresh grant runs: the browser-driven authorization-code
//!    flow with PKCE for interactive logins, or the client-credentials
//!    grant for confidential clients.
//!
//! A fresh acquisition either succeeds or fails terminally; there is no
//! retry loop at this layer.

pub mod acquirer;
pub mod store;

pub use acquirer::{AccessToken, TokenAcquirer, PUBLIC_CLIENT_ID};
pub use store::{TokenRecord, TokenStore};
