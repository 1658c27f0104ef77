//! spmpix-core: Core types for scanning probe microscopy session processing.
//!
//! This crate holds the pure, I/O-free parts of the pipeline: metadata
//! parsing, channel-to-bitmap name matching, scale bar selection and the
//! annotation and slide layout geometry.
//!

pub mod config;
pub mod correlate;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod params;
pub mod scale_bar;
pub mod slides;

pub use config::PipelineConfig;
pub use correlate::{normalize_stem, stem_matches, Correlation};
pub use error::{Error, Result};
pub use layout::{
    fit_image, metadata_lines, scale_bar_layout, text_box_layout, AnnotationConfig, Placement,
    ScaleBarLayout, TextBoxLayout,
};
pub use metadata::{parse_metadata, Metadata};
pub use params::{ParamValue, ParameterSet};
pub use scale_bar::{PhysicalScale, ScaleBarConfig};
pub use slides::{SlideDeckConfig, SlideGrid};
