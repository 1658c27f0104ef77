//! spmpix-io: File-level processing of scanning probe microscopy sessions.
//!
//! This crate reads metadata and raw channel files (the latter through
//! memory maps via memmap2), copies informative channels with their preview
//! bitmaps into an output directory, and renders the annotated figures and
//! slide pages.
//!

pub mod batch;
mod correlate;
mod error;
mod fileops;
mod font;
mod metadata;
pub mod pipeline;
mod reader;
pub mod render;
pub mod slides;
pub mod validate;

pub use batch::{batch_process_directory, BatchOptions, BatchSummary};
pub use correlate::{find_matching_bitmaps, list_files_with_extensions};
pub use error::{Error, Result};
pub use fileops::copy_into;
pub use font::TextPainter;
pub use metadata::read_metadata_file;
pub use pipeline::{process_metadata_file, AssetKind, FileReport, Issue, SessionProcessor};
pub use reader::ChannelFileReader;
pub use render::{render_annotation, AnnotationReport, Annotator};
pub use slides::export_slides;
pub use validate::{check_channel_file, expected_channel_bytes, is_informative_channel, ChannelCheck};
