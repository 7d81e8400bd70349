use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use regex::Regex;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{loader, DocumentSource};
use crate::error::LoadError;
use crate::models::Document;

/// File layout of a data directory.
#[derive(Debug, Clone)]
pub struct DirectoryLayout {
    pub root_file: PathBuf,
    pub province_dir: PathBuf,
    pub county_dir: PathBuf,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        Self {
            root_file: PathBuf::from("china.json"),
            province_dir: PathBuf::from("geometryProvince"),
            county_dir: PathBuf::from("geometryCouties"),
        }
    }
}

/// Documents stored as files: `<root_file>`, `<province_dir>/<code>.json`
/// and `<county_dir>/<key>.json` (optionally gzipped).
pub struct DirectorySource {
    root_path: PathBuf,
    province_dir: PathBuf,
    /// County key -> file, discovered once up front
    county_files: HashMap<String, PathBuf>,
    /// Sorted county keys
    county_keys: Vec<String>,
}

impl DirectorySource {
    pub fn new(base: &Path, layout: &DirectoryLayout) -> Self {
        let county_dir = base.join(&layout.county_dir);
        let county_files = scan_county_dir(&county_dir);
        let mut county_keys: Vec<String> = county_files.keys().cloned().collect();
        county_keys.sort();

        info!(
            "Found {} county documents in {}",
            county_keys.len(),
            county_dir.display()
        );

        Self {
            root_path: base.join(&layout.root_file),
            province_dir: base.join(&layout.province_dir),
            county_files,
            county_keys,
        }
    }

    fn province_path(&self, code: &str) -> PathBuf {
        let plain = self.province_dir.join(format!("{}.json", code));
        if plain.exists() {
            return plain;
        }
        let gz = self.province_dir.join(format!("{}.json.gz", code));
        if gz.exists() {
            gz
        } else {
            plain
        }
    }
}

fn scan_county_dir(dir: &Path) -> HashMap<String, PathBuf> {
    let mut files = HashMap::new();
    if !dir.exists() {
        warn!("County directory not found: {}", dir.display());
        return files;
    }

    let file_regex = match Regex::new(r"^(\d{2,12})\.json(\.gz)?$") {
        Ok(r) => r,
        Err(e) => {
            warn!("Invalid county file pattern: {}", e);
            return files;
        }
    };

    for entry in WalkDir::new(dir).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error scanning {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some(caps) = file_regex.captures(file_name) {
            let key = caps[1].to_string();
            // Prefer the plain file when both forms exist.
            if caps.get(2).is_none() || !files.contains_key(&key) {
                files.insert(key, entry.path().to_path_buf());
            }
        }
    }
    files
}

impl DocumentSource for DirectorySource {
    fn root(&self) -> Result<Document, LoadError> {
        loader::load(&self.root_path)
    }

    fn province(&self, code: &str) -> Result<Document, LoadError> {
        loader::load(&self.province_path(code))
    }

    fn county_keys(&self, prefix: &str) -> Vec<String> {
        self.county_keys
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn county(&self, key: &str) -> Result<Document, LoadError> {
        match self.county_files.get(key) {
            Some(path) => loader::load(path),
            None => Err(LoadError::missing(key)),
        }
    }
}
