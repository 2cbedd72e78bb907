use serde::Serialize;
use thiserror::Error;

use crate::driver::FileReport;

/// Renders batch results for humans or machines.
pub struct MigrationReporter {
    output_format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Console,
    Json,
}

/// Aggregate view over one batch of files.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub total_files: usize,
    pub files_changed: usize,
    pub files_failed: usize,
    pub documents_changed: usize,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl MigrationReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Console,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn generate_report(&self, files: Vec<FileReport>) -> MigrationReport {
        let files_changed = files.iter().filter(|f| f.output.is_some()).count();
        let files_failed = files.iter().filter(|f| f.error.is_some()).count();
        let documents_changed = files
            .iter()
            .flat_map(|f| &f.results)
            .filter(|r| r.changed)
            .count();

        MigrationReport {
            total_files: files.len(),
            files_changed,
            files_failed,
            documents_changed,
            files,
        }
    }

    pub fn format_report(&self, report: &MigrationReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Console => Ok(self.format_console_report(report)),
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| ReportError::SerializationError(e.to_string())),
        }
    }

    fn format_console_report(&self, report: &MigrationReport) -> String {
        let mut output = String::new();

        output.push_str("=== Migration Report ===\n\n");
        for file in &report.files {
            if let Some(error) = &file.error {
                output.push_str(&format!("❌ {}: {}\n", file.input.display(), error));
            } else if let Some(out_path) = &file.output {
                output.push_str(&format!(
                    "✅ {} -> {}\n",
                    file.input.display(),
                    out_path.display()
                ));
                for result in file.results.iter().filter(|r| r.changed) {
                    output.push_str(&format!("     {}\n", result.description));
                }
            } else {
                output.push_str(&format!(
                    "  ℹ No migrations needed for {}\n",
                    file.input.display()
                ));
            }
        }

        output.push_str(&format!(
            "\nFiles: {} total, {} migrated, {} failed\n",
            report.total_files, report.files_changed, report.files_failed
        ));
        output.push_str(&format!(
            "Documents migrated: {}\n",
            report.documents_changed
        ));

        output
    }
}

impl Default for MigrationReporter {
    fn default() -> Self {
        Self::new()
    }
}
