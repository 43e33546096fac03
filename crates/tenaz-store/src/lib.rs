//! Local object store
//!
//! Presents a stable view of each remote object kind while minimizing API
//! cost. Every kind owns two gzip-compressed JSON files keyed by tenant id
//! and kind: a *snapshot* holding the merged object list and a
//! *delta-link* holding the last continuation token. The merge algorithm
//! folds server change sets into the snapshot; the filter matcher serves
//! substring queries from it.

pub mod filter;
pub mod merge;
pub mod snapshot;
pub mod store;

pub use merge::merge;
pub use store::ObjectStore;
