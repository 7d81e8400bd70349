use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::LoadError;
use crate::models::Document;

/// Read and parse one document from disk. `.gz` files are decompressed.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let document: Document = load_json(path)?;
    debug!("Loaded {} ({} features)", path.display(), document.features.len());
    Ok(document)
}

/// Read any JSON artifact, e.g. a persisted merge result being reloaded.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let key = path.display().to_string();
    let file = File::open(path).map_err(|source| LoadError::Io {
        key: key.clone(),
        source,
    })?;

    let mut reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(BufReader::new(file))
    };

    // Read fully first so decoder I/O errors are not reported as parse errors.
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|source| LoadError::Io {
            key: key.clone(),
            source,
        })?;

    serde_json::from_slice(&content).map_err(|source| LoadError::Parse { key, source })
}

pub fn parse(key: &str, content: &[u8]) -> Result<Document, LoadError> {
    serde_json::from_slice(content).map_err(|source| LoadError::Parse {
        key: key.to_string(),
        source,
    })
}
