//! Hierarchy assembly, validation and reporting.

mod builder;
mod report;
mod validate;

pub use builder::HierarchyBuilder;
pub use report::{report, CitySummary, ProvinceSummary, Summary, SummaryReport};
pub use validate::{validate, ValidationOutcome};
