//! Pipeline configuration.

use crate::layout::AnnotationConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for processing one session metadata file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// A channel is processed when its file name contains any of these.
    pub keywords: Vec<String>,
    /// Extensions (without dot, case-insensitive) of preview bitmaps.
    pub bitmap_extensions: Vec<String>,
    /// Scan width assumed when the metadata has none (default: 100 nm).
    pub fallback_scan_range_nm: f64,
    /// Annotation layout.
    pub annotation: AnnotationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keywords: vec!["TopoFwd".to_string(), "It_extFwd".to_string()],
            bitmap_extensions: vec!["bmp".to_string()],
            fallback_scan_range_nm: 100.0,
            annotation: AnnotationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the channel keywords.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fallback scan width.
    #[must_use]
    pub fn with_fallback_scan_range(mut self, scan_range_nm: f64) -> Self {
        self.fallback_scan_range_nm = scan_range_nm;
        self
    }

    /// Set the annotation configuration.
    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationConfig) -> Self {
        self.annotation = annotation;
        self
    }

    /// True when `channel` contains at least one keyword.
    #[must_use]
    pub fn wants_channel(&self, channel: &str) -> bool {
        self.keywords.iter().any(|k| channel.contains(k.as_str()))
    }

    /// True when `extension` is one of the bitmap extensions.
    #[must_use]
    pub fn is_bitmap_extension(&self, extension: &str) -> bool {
        self.bitmap_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}
