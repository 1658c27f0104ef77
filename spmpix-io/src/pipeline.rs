//! Per-session processing: validate, copy, correlate and annotate.
//!
//! For one metadata file every channel of interest is checked, informative
//! channels are copied to the output directory together with their preview
//! bitmap, and the copied bitmap is annotated in place. The metadata file
//! itself is copied only when at least one channel was kept.
//!
//! Nothing here fails the caller: problems become [`Issue`]s on the
//! returned [`FileReport`] and a log line keyed by file name.

use std::fmt;
use std::path::{Path, PathBuf};

use spmpix_core::{Correlation, Metadata, PipelineConfig};

use crate::correlate::find_matching_bitmaps;
use crate::fileops::copy_into;
use crate::metadata::read_metadata_file;
use crate::render::Annotator;
use crate::validate::{check_channel_file, display_name, ChannelCheck};

/// What kind of file a [`Issue::MissingAsset`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Metadata,
    Channel,
    Bitmap,
}

/// A problem that ended processing of a metadata file or one of its channels,
/// or a warning about a choice that was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Issue {
    /// Pixel geometry absent or not an integer; the whole file is skipped.
    MissingRequiredParameter { metadata: String, key: String },
    /// Channel byte length does not match the geometry.
    SizeMismatch {
        channel: String,
        expected: u64,
        actual: u64,
    },
    /// Channel has the right size but holds only zeros.
    DegenerateData { channel: String },
    /// Channel exists but could not be read.
    UnreadableChannel { channel: String, reason: String },
    /// A referenced or correlated file is absent.
    MissingAsset { name: String, kind: AssetKind },
    /// Several bitmaps matched; the first was used.
    AmbiguousCorrelation {
        channel: String,
        chosen: String,
        candidates: usize,
    },
    /// Annotation failed; the unannotated copy stays in place.
    RenderingFailure { bitmap: String },
    /// A plain copy into the output directory failed.
    CopyFailure { file: String, reason: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredParameter { metadata, key } => {
                write!(f, "Skipping {metadata}: missing or invalid {key}")
            }
            Self::SizeMismatch {
                channel,
                expected,
                actual,
            } => write!(
                f,
                "Skipped {channel}: invalid size ({actual} bytes, expected {expected})"
            ),
            Self::DegenerateData { channel } => write!(f, "Skipped {channel}: all zeros"),
            Self::UnreadableChannel { channel, reason } => {
                write!(f, "Skipped {channel}: {reason}")
            }
            Self::MissingAsset { name, kind } => match kind {
                AssetKind::Metadata => write!(f, "Cannot read metadata file: {name}"),
                AssetKind::Channel => write!(f, "Missing channel file: {name}"),
                AssetKind::Bitmap => write!(f, "No matching bitmap found for {name}"),
            },
            Self::AmbiguousCorrelation {
                channel,
                chosen,
                candidates,
            } => write!(
                f,
                "{candidates} bitmaps match {channel}, using {chosen}"
            ),
            Self::RenderingFailure { bitmap } => {
                write!(f, "Annotation failed for {bitmap}, kept unannotated copy")
            }
            Self::CopyFailure { file, reason } => write!(f, "Could not copy {file}: {reason}"),
        }
    }
}

/// Outcome of processing one metadata file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileReport {
    pub metadata: PathBuf,
    /// Channel names kept, in metadata order.
    pub retained_channels: Vec<String>,
    /// Bitmaps in the output directory that were annotated.
    pub annotated_bitmaps: Vec<PathBuf>,
    pub issues: Vec<Issue>,
}

impl FileReport {
    fn new(metadata: &Path) -> Self {
        Self {
            metadata: metadata.to_path_buf(),
            ..Self::default()
        }
    }

    /// File name of the metadata file.
    #[must_use]
    pub fn name(&self) -> String {
        display_name(&self.metadata)
    }

    #[must_use]
    pub fn is_retained(&self) -> bool {
        !self.retained_channels.is_empty()
    }

    fn warn(&mut self, issue: Issue) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    fn note(&mut self, issue: Issue) {
        log::info!("{issue}");
        self.issues.push(issue);
    }
}

/// Processes metadata files with one configuration and one loaded font.
pub struct SessionProcessor {
    config: PipelineConfig,
    annotator: Annotator,
}

impl SessionProcessor {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let annotator = Annotator::new(config.annotation.clone());
        Self { config, annotator }
    }

    /// Create a processor that renders with an explicit annotator.
    #[must_use]
    pub fn with_annotator(config: PipelineConfig, annotator: Annotator) -> Self {
        Self { config, annotator }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one metadata file into `output_dir`.
    ///
    /// Channel files and bitmaps are looked up next to the metadata file.
    pub fn process(&self, metadata_path: &Path, output_dir: &Path) -> FileReport {
        let mut report = FileReport::new(metadata_path);
        let name = report.name();

        let metadata = match read_metadata_file(metadata_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Error reading {name}: {e}");
                report.warn(Issue::MissingAsset {
                    name,
                    kind: AssetKind::Metadata,
                });
                return report;
            }
        };

        let (width, height) = match metadata.require_pixel_dimensions() {
            Ok(dimensions) => dimensions,
            Err(e) => {
                let key = match e {
                    spmpix_core::Error::MissingParameter(key) => key,
                    other => other.to_string(),
                };
                report.warn(Issue::MissingRequiredParameter {
                    metadata: name,
                    key,
                });
                return report;
            }
        };

        let base_dir = metadata_path.parent().unwrap_or_else(|| Path::new("."));
        self.process_channels(&metadata, base_dir, (width, height), output_dir, &mut report);

        if report.is_retained() {
            match copy_into(metadata_path, output_dir) {
                Ok(_) => log::info!(
                    "{name} -> {} channel(s) copied",
                    report.retained_channels.len()
                ),
                Err(e) => report.warn(Issue::CopyFailure {
                    file: name,
                    reason: e.to_string(),
                }),
            }
        } else {
            log::info!("{name} skipped: no informative channels");
        }

        report
    }

    fn process_channels(
        &self,
        metadata: &Metadata,
        base_dir: &Path,
        (width, height): (u32, u32),
        output_dir: &Path,
        report: &mut FileReport,
    ) {
        let scan_range_nm = metadata.scan_range_nm(self.config.fallback_scan_range_nm);

        for channel in &metadata.channels {
            if !self.config.wants_channel(channel) {
                continue;
            }

            let channel_path = base_dir.join(channel);
            if !channel_path.exists() {
                report.warn(Issue::MissingAsset {
                    name: channel.clone(),
                    kind: AssetKind::Channel,
                });
                continue;
            }

            match check_channel_file(&channel_path, width, height) {
                ChannelCheck::Informative => {}
                ChannelCheck::Degenerate => {
                    report.note(Issue::DegenerateData {
                        channel: channel.clone(),
                    });
                    continue;
                }
                ChannelCheck::SizeMismatch { expected, actual } => {
                    report.note(Issue::SizeMismatch {
                        channel: channel.clone(),
                        expected,
                        actual,
                    });
                    continue;
                }
                ChannelCheck::Unreadable(reason) => {
                    report.warn(Issue::UnreadableChannel {
                        channel: channel.clone(),
                        reason,
                    });
                    continue;
                }
            }

            if let Err(e) = copy_into(&channel_path, output_dir) {
                report.warn(Issue::CopyFailure {
                    file: channel.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            report.retained_channels.push(channel.clone());

            self.annotate_channel(
                &channel_path,
                base_dir,
                output_dir,
                scan_range_nm,
                width,
                metadata,
                report,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn annotate_channel(
        &self,
        channel_path: &Path,
        base_dir: &Path,
        output_dir: &Path,
        scan_range_nm: f64,
        raw_pixel_width: u32,
        metadata: &Metadata,
        report: &mut FileReport,
    ) {
        let channel = display_name(channel_path);
        let matches =
            find_matching_bitmaps(channel_path, base_dir, &self.config.bitmap_extensions)
                .unwrap_or_else(|e| {
                    log::warn!("Cannot list bitmaps for {channel}: {e}");
                    Vec::new()
                });

        let bitmap = match Correlation::from_matches(matches) {
            Correlation::None => {
                report.warn(Issue::MissingAsset {
                    name: channel,
                    kind: AssetKind::Bitmap,
                });
                return;
            }
            Correlation::Unique(bitmap) => bitmap,
            Correlation::Ambiguous { chosen, candidates } => {
                report.warn(Issue::AmbiguousCorrelation {
                    channel,
                    chosen: display_name(&chosen),
                    candidates: candidates.len(),
                });
                chosen
            }
        };

        let copied = match copy_into(&bitmap, output_dir) {
            Ok(copied) => copied,
            Err(e) => {
                report.warn(Issue::CopyFailure {
                    file: display_name(&bitmap),
                    reason: e.to_string(),
                });
                return;
            }
        };

        if self
            .annotator
            .annotate_in_place(&copied, scan_range_nm, raw_pixel_width, &metadata.params)
        {
            report.annotated_bitmaps.push(copied);
        } else {
            report.issues.push(Issue::RenderingFailure {
                bitmap: display_name(&copied),
            });
        }
    }
}

/// Process one metadata file with a freshly created [`SessionProcessor`].
///
/// Returns the names of the retained channels; empty when the file was
/// skipped or had no informative channel.
pub fn process_metadata_file(
    metadata_path: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Vec<String> {
    SessionProcessor::new(config.clone())
        .process(metadata_path, output_dir)
        .retained_channels
}
