//! Delta-query change stream walker
//!
//! Implements the delta pattern the directory API exposes: pages are
//! chained through `@odata.nextLink` and the stream always ends with a
//! page carrying `@odata.deltaLink`, the continuation token for the next
//! invocation. Server page order is preserved; transport failures
//! propagate to the caller.

use std::io::Write as _;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use tenaz_core::domain::document::str_of;
use tenaz_core::{Error, Result};

use crate::client::ApiClient;

/// Clears the current terminal line so progress counts overwrite in place.
const LINE_RESET: &str = "\x1B[2K\r";

/// Every object from a change stream plus its continuation link.
#[derive(Debug, Default)]
pub struct DeltaResult {
    pub objects: Vec<Value>,
    pub delta_link: Option<String>,
}

/// Walk a change stream from `start_url` to its final page.
///
/// `headers` apply to every page request of this walk; the caller passes
/// the first-fetch headers (`Prefer: return=minimal`, `deltaToken: latest`)
/// only when starting a full stream, never when resuming a stored link.
/// With `verbose` set, a progress count overwrites the current line after
/// each page.
pub async fn fetch_delta(
    client: &ApiClient,
    start_url: &str,
    headers: &[(&str, &str)],
    verbose: bool,
) -> Result<DeltaResult> {
    let mut result = DeltaResult::default();
    let mut url = start_url.to_string();
    let mut calls: u32 = 0;

    loop {
        calls += 1;
        let mut request = client.request(Method::GET, &url);
        for (key, value) in headers {
            request = request.header(key, value);
        }
        let response = request.send().await?.into_result()?;

        let page = response.value_list();
        let page_len = page.len();
        result.objects.extend(page.iter().cloned());

        if verbose {
            print!("{LINE_RESET}(API calls = {calls}) {page_len} objects in set {calls}");
            let _ = std::io::stdout().flush();
        }
        debug!(calls, page_len, "delta page received");

        let body = response.body.as_ref().ok_or_else(|| {
            Error::Format("change stream page had an empty body".to_string())
        })?;

        let delta_link = str_of(body, "@odata.deltaLink");
        if !delta_link.is_empty() {
            if verbose {
                println!();
            }
            result.delta_link = Some(delta_link.to_string());
            debug!(
                total = result.objects.len(),
                calls, "change stream complete"
            );
            return Ok(result);
        }

        let next_link = str_of(body, "@odata.nextLink");
        if next_link.is_empty() {
            if verbose {
                println!();
            }
            return Err(Error::Format(
                "change stream page carried neither a nextLink nor a deltaLink".to_string(),
            ));
        }
        url = next_link.to_string();
    }
}
