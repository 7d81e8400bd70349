//! Admerge - merges province, city and county boundary datasets into one
//! three-level administrative hierarchy.
//!
//! This library provides the pipeline stages used by the `merge` binary.

pub mod code;
pub mod edition;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod pipeline;
pub mod source;

pub use edition::Edition;
pub use models::{MergeResult, Region, RegionLevel};
pub use pipeline::{Pipeline, PipelineState, RunSummary};
