//! Document lookup for the hierarchy builder.
//!
//! The builder asks a [`DocumentSource`] for documents by key and never
//! touches storage itself, so tests can run against in-memory fixtures.

mod directory;
mod loader;
mod memory;

pub use directory::{DirectoryLayout, DirectorySource};
pub use loader::{load, load_json, parse};
pub use memory::MemorySource;

use crate::error::LoadError;
use crate::models::Document;

pub trait DocumentSource: Sync {
    /// The nationwide document keyed by province code.
    fn root(&self) -> Result<Document, LoadError>;

    /// The per-province document listing city features.
    fn province(&self, code: &str) -> Result<Document, LoadError>;

    /// Keys of county documents starting with `prefix`, in scan order.
    fn county_keys(&self, prefix: &str) -> Vec<String>;

    /// A county document by one of the keys from [`DocumentSource::county_keys`].
    fn county(&self, key: &str) -> Result<Document, LoadError>;
}
