//! Core data models for the merge pipeline.

pub mod document;
pub mod geometry;
pub mod region;

pub use document::{Document, Feature, FeatureProperties};
pub use geometry::{GeoBbox, Geometry};
pub use region::{MergeResult, Region, RegionLevel, Totals};
