//! Dataset retrieval and ordering.
//!
//! The catalog is the fetched side of the pipeline:
//!
//! - [`model`] - serde wire shapes for the category/group/item document
//! - fetching - cache-bypassing HTTP retrieval with typed failures
//! - sorting - primary-strength collation, non-destructive
//!
//! The dataset lives only for the duration of one render pass; nothing here
//! caches or diffs between invocations.

mod fetch;
pub mod model;
mod sort;

pub use fetch::{build_client, fetch_dataset, FetchError};
pub use sort::{collation_key, sorted_groups};
