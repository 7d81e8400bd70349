//! Pipeline driver: load -> build -> persist -> reload -> validate -> report.
//!
//! Only two things are fatal: an unreadable root document (nothing is
//! written) and a merged document that cannot be written or read back.
//! Everything else, including a report that cannot be written, ends up in
//! the [`RunSummary`] and the run reaches `Done`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use xxhash_rust::xxh64::xxh64;

use crate::edition::Edition;
use crate::error::{LoadError, PipelineError};
use crate::hierarchy::{report, validate, HierarchyBuilder, SummaryReport, ValidationOutcome};
use crate::models::{MergeResult, Totals};
use crate::source::{load_json, DocumentSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loading,
    Building,
    Persisting,
    Reloading,
    Validating,
    Reporting,
    Done,
    Failed,
}

/// Outcome of a run that reached `Done`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub totals: Totals,
    pub validation: ValidationOutcome,
    pub report: SummaryReport,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    /// xxh64 of the persisted hierarchy document
    pub output_digest: u64,
    /// xxh64 of the persisted report document, if it was written
    pub report_digest: Option<u64>,
    /// Why the report document could not be written
    pub report_error: Option<String>,
}

type ReloadFn = fn(&Path) -> Result<MergeResult, LoadError>;

pub struct Pipeline<'a> {
    edition: &'a Edition,
    source: &'a dyn DocumentSource,
    output_path: PathBuf,
    report_path: PathBuf,
    progress: Option<ProgressBar>,
    state: PipelineState,
    reload: ReloadFn,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        edition: &'a Edition,
        source: &'a dyn DocumentSource,
        output_path: impl Into<PathBuf>,
        report_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            edition,
            source,
            output_path: output_path.into(),
            report_path: report_path.into(),
            progress: None,
            state: PipelineState::Idle,
            reload: load_json::<MergeResult>,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        error!("Pipeline failed in {:?}: {}", self.state, err);
        self.transition(PipelineState::Failed);
        err
    }

    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        let started = Utc::now();

        self.transition(PipelineState::Loading);
        let root = match self.source.root() {
            Ok(root) => root,
            Err(e) => return Err(self.fail(PipelineError::RootUnavailable(e))),
        };
        info!("Root document has {} features", root.features.len());

        self.transition(PipelineState::Building);
        let mut builder = HierarchyBuilder::new(self.edition);
        if let Some(pb) = &self.progress {
            builder = builder.with_progress(pb.clone());
        }
        let merged = builder.build(&root, self.source);
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        self.transition(PipelineState::Persisting);
        let output_digest = match write_json(&self.output_path, &merged) {
            Ok(digest) => digest,
            Err(e) => return Err(self.fail(e)),
        };
        info!("Wrote {}", self.output_path.display());

        self.transition(PipelineState::Reloading);
        let reloaded = match (self.reload)(&self.output_path) {
            Ok(result) => result,
            Err(e) => return Err(self.fail(PipelineError::Reload(e))),
        };

        self.transition(PipelineState::Validating);
        let validation = validate(&reloaded);
        for message in &validation.errors {
            error!("Validation error: {}", message);
        }
        for message in &validation.warnings {
            warn!("Validation warning: {}", message);
        }

        self.transition(PipelineState::Reporting);
        let summary_report = report(&reloaded);
        let (report_digest, report_error) = match write_json(&self.report_path, &summary_report) {
            Ok(digest) => {
                info!("Wrote {}", self.report_path.display());
                (Some(digest), None)
            }
            Err(e) => {
                error!("Report not written: {}", e);
                (None, Some(e.to_string()))
            }
        };

        self.transition(PipelineState::Done);
        let elapsed = Utc::now() - started;
        info!(
            "Done in {} ms: {} provinces, {} cities, {} counties; {} errors, {} warnings",
            elapsed.num_milliseconds(),
            reloaded.totals.province_count,
            reloaded.totals.city_count,
            reloaded.totals.county_count,
            validation.errors.len(),
            validation.warnings.len()
        );
        info!("Output digest: {:016x}", output_digest);
        if let Some(digest) = report_digest {
            info!("Report digest: {:016x}", digest);
        }

        Ok(RunSummary {
            totals: reloaded.totals,
            validation,
            report: summary_report,
            output_path: self.output_path.clone(),
            report_path: self.report_path.clone(),
            output_digest,
            report_digest,
            report_error,
        })
    }
}

/// Serialize `value` as two-space-indented JSON and replace `path` with it.
///
/// The bytes go to a sibling temp file first so a failed write never leaves
/// a truncated artifact behind. Returns the xxh64 digest of what was written.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<u64, PipelineError> {
    let persist_err = |source: std::io::Error| PipelineError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let bytes = serde_json::to_vec_pretty(value).map_err(|e| persist_err(e.into()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, &bytes).map_err(persist_err)?;
    fs::rename(&tmp, path).map_err(persist_err)?;

    Ok(xxh64(&bytes, 0))
}
