//! Integration tests for tenaz-api
//!
//! Uses wiremock to simulate both backend APIs and verifies end-to-end
//! behavior of the ApiClient and the delta-query walker.

mod common;

mod test_client;
mod test_delta;
