use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::stream::{migrate_stream, DocumentResult, StreamError};
use crate::transformer::DocumentTransformer;

/// Drives the stream migrator across files and directories, owning the only
/// I/O in the crate. The engine itself stays pure.
pub struct Migrator {
    transformer: DocumentTransformer,
    output_dir: PathBuf,
    log: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of migrating one file. `output` is set only when at least one
/// document in the file changed.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub results: Vec<DocumentResult>,
}

impl FileOutcome {
    pub fn changed_count(&self) -> usize {
        self.results.iter().filter(|r| r.changed).count()
    }
}

/// Per-file record for directory batches. A failed file is reported here
/// instead of aborting its siblings.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub results: Vec<DocumentResult>,
    pub error: Option<String>,
}

impl FileReport {
    fn from_outcome(outcome: FileOutcome) -> Self {
        Self {
            input: outcome.input,
            output: outcome.output,
            results: outcome.results,
            error: None,
        }
    }

    fn from_error(input: PathBuf, err: &MigrateError) -> Self {
        Self {
            input,
            output: None,
            results: Vec::new(),
            error: Some(err.to_string()),
        }
    }
}

impl Migrator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_transformer(output_dir, DocumentTransformer::default())
    }

    pub fn with_transformer(
        output_dir: impl Into<PathBuf>,
        transformer: DocumentTransformer,
    ) -> Self {
        Self {
            transformer,
            output_dir: output_dir.into(),
            log: Vec::new(),
        }
    }

    /// Migrate one manifest file. When a migration applies, the result is
    /// written as `{stem}.migrated{suffix}` in the output directory.
    pub fn migrate_file(&mut self, input: &Path) -> Result<FileOutcome, MigrateError> {
        if !input.is_file() {
            return Err(MigrateError::InputNotFound(input.to_path_buf()));
        }

        let raw = fs::read_to_string(input).map_err(|source| MigrateError::Io {
            path: input.to_path_buf(),
            source,
        })?;

        let outcome = migrate_stream(&self.transformer, &raw)?;

        for result in outcome.results.iter().filter(|r| r.changed) {
            self.log.push(format!("  {}", result.description));
        }

        let output = match outcome.output {
            None => {
                tracing::info!(input = %input.display(), "no migrations needed");
                None
            }
            Some(text) => {
                fs::create_dir_all(&self.output_dir).map_err(|source| MigrateError::Io {
                    path: self.output_dir.clone(),
                    source,
                })?;

                let out_path = self.output_dir.join(migrated_file_name(input));
                fs::write(&out_path, text).map_err(|source| MigrateError::Io {
                    path: out_path.clone(),
                    source,
                })?;

                tracing::info!(input = %input.display(), output = %out_path.display(), "migrated");
                self.log
                    .push(format!("Migrated: {} -> {}", input.display(), out_path.display()));
                Some(out_path)
            }
        };

        Ok(FileOutcome {
            input: input.to_path_buf(),
            output,
            results: outcome.results,
        })
    }

    /// Migrate every `*.yaml`/`*.yml` file in a directory, in file-stable
    /// order. Failures are local to one file: the batch continues and the
    /// failure lands in that file's report.
    pub fn migrate_directory(&mut self, dir: &Path) -> Result<Vec<FileReport>, MigrateError> {
        if !dir.is_dir() {
            return Err(MigrateError::InputNotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        let entries = fs::read_dir(dir).map_err(|source| MigrateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| MigrateError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_manifest = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if path.is_file() && is_manifest {
                files.push(path);
            }
        }
        files.sort();

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            match self.migrate_file(&file) {
                Ok(outcome) => reports.push(FileReport::from_outcome(outcome)),
                Err(err) => {
                    tracing::warn!(input = %file.display(), error = %err, "skipping file");
                    self.log.push(format!("Error migrating {}: {}", file.display(), err));
                    reports.push(FileReport::from_error(file, &err));
                }
            }
        }

        Ok(reports)
    }

    /// Human-readable log of everything this migrator has done so far.
    pub fn summary(&self) -> String {
        if self.log.is_empty() {
            "No migrations performed.".to_string()
        } else {
            self.log.join("\n")
        }
    }
}

/// Output naming contract: `{original-stem}.migrated{original-suffix}`.
fn migrated_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match input.extension() {
        Some(ext) => format!("{}.migrated.{}", stem, ext.to_string_lossy()),
        None => format!("{stem}.migrated"),
    }
}
