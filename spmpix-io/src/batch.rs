//! Batch processing of a data directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use spmpix_core::PipelineConfig;

use crate::correlate::list_files_with_extensions;
use crate::pipeline::{FileReport, SessionProcessor};
use crate::{Error, Result};

/// Options for [`batch_process_directory`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    /// Output directory name, created inside the data directory (default: "Processed").
    pub output_subdir: String,
    /// Extensions of metadata files (default: txt).
    pub metadata_extensions: Vec<String>,
    /// Process metadata files in parallel. Channels within a file are always sequential.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_subdir: "Processed".to_string(),
            metadata_extensions: vec!["txt".to_string()],
            parallel: false,
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub fn with_output_subdir(mut self, output_subdir: impl Into<String>) -> Self {
        self.output_subdir = output_subdir.into();
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Reports for every metadata file of a batch, in file name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub output_dir: PathBuf,
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    /// Metadata files that kept at least one channel.
    pub fn retained(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.is_retained())
    }

    /// Total number of retained channels.
    #[must_use]
    pub fn retained_channel_count(&self) -> usize {
        self.retained().map(|r| r.retained_channels.len()).sum()
    }

    /// Annotated bitmaps across all files.
    pub fn annotated_bitmaps(&self) -> impl Iterator<Item = &Path> {
        self.reports
            .iter()
            .flat_map(|r| r.annotated_bitmaps.iter().map(PathBuf::as_path))
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Summary ===")?;
        for report in self.retained() {
            writeln!(
                f,
                "{}: {} channel(s) kept",
                report.name(),
                report.retained_channels.len()
            )?;
            for channel in &report.retained_channels {
                writeln!(f, "  - {channel}")?;
            }
        }
        Ok(())
    }
}

/// Process every metadata file in `data_dir` into
/// `data_dir/<options.output_subdir>`.
///
/// # Errors
/// Returns an error only if the output directory cannot be created or the
/// data directory cannot be listed. Per-file problems end up in the reports.
pub fn batch_process_directory(
    data_dir: &Path,
    options: &BatchOptions,
    config: &PipelineConfig,
) -> Result<BatchSummary> {
    let output_dir = data_dir.join(&options.output_subdir);
    fs::create_dir_all(&output_dir).map_err(|e| Error::at(&output_dir, e))?;

    let metadata_files = list_files_with_extensions(data_dir, &options.metadata_extensions)?;
    log::info!(
        "Processing {} metadata file(s) from {}",
        metadata_files.len(),
        data_dir.display()
    );

    let processor = SessionProcessor::new(config.clone());
    let reports: Vec<FileReport> = if options.parallel {
        metadata_files
            .par_iter()
            .map(|path| processor.process(path, &output_dir))
            .collect()
    } else {
        metadata_files
            .iter()
            .map(|path| processor.process(path, &output_dir))
            .collect()
    };

    Ok(BatchSummary {
        output_dir,
        reports,
    })
}
