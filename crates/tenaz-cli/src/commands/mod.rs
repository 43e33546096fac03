//! CLI command implementations

pub mod cache;
pub mod compare;
pub mod count;
pub mod creds;
pub mod delete;
pub mod list;
pub mod report;
pub mod resolve;
pub mod runtime;
pub mod show;
pub mod tree;
pub mod upsert;

use anyhow::{bail, Result};
use tenaz_core::ObjectKind;

/// Parse a kind tag argument, with a helpful failure message.
pub(crate) fn parse_kind(tag: &str) -> Result<ObjectKind> {
    match tag.parse::<ObjectKind>() {
        Ok(kind) => Ok(kind),
        Err(e) => bail!("{e}"),
    }
}
