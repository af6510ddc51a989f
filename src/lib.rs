//! linkdeck bakes categorized bookmark JSON into static HTML pages as
//! grouped, alphabetically sorted card lists.
//!
//! Pipeline: locate the mount element in a page, read its `data-source`
//! attribute, fetch the JSON dataset (cache bypassed), sort groups and
//! items with primary-strength collation, build an escaped card fragment,
//! and splice it back into the page atomically.

pub mod catalog;
pub mod config;
pub mod page;
pub mod pipeline;
pub mod render;
