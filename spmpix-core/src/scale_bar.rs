//! Scale bar length selection.
//!
//! A scale bar is drawn with one of a small set of "round" lengths so the
//! label never needs arbitrary precision. The chosen length is the largest
//! option that fits in a fraction of the physical field of view.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for scale bar selection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScaleBarConfig {
    /// Candidate bar lengths in nanometers (default: 1000..2).
    pub options_nm: Vec<u32>,
    /// Length used when no option fits (default: 10).
    pub fallback_nm: u32,
    /// Maximum share of the total physical width a bar may cover (default: 0.25).
    pub max_fraction: f64,
}

impl Default for ScaleBarConfig {
    fn default() -> Self {
        Self {
            options_nm: vec![1000, 500, 200, 100, 50, 25, 20, 10, 5, 2],
            fallback_nm: 10,
            max_fraction: 0.25,
        }
    }
}

impl ScaleBarConfig {
    /// Set the candidate lengths.
    #[must_use]
    pub fn with_options(mut self, options_nm: Vec<u32>) -> Self {
        self.options_nm = options_nm;
        self
    }

    /// Set the fallback length.
    #[must_use]
    pub fn with_fallback(mut self, fallback_nm: u32) -> Self {
        self.fallback_nm = fallback_nm;
        self
    }

    /// Set the maximum width fraction.
    #[must_use]
    pub fn with_max_fraction(mut self, max_fraction: f64) -> Self {
        self.max_fraction = max_fraction;
        self
    }

    /// Pick the bar length for a field of view `total_nm` wide.
    ///
    /// The largest option not exceeding `max_fraction * total_nm` wins,
    /// regardless of the order of `options_nm`. With no qualifying option
    /// the fallback is returned, even if it is larger than the threshold.
    #[must_use]
    pub fn select_length(&self, total_nm: f64) -> u32 {
        let threshold = total_nm * self.max_fraction;
        self.options_nm
            .iter()
            .copied()
            .filter(|&length| f64::from(length) <= threshold)
            .max()
            .unwrap_or(self.fallback_nm)
    }
}

/// Physical calibration of a bitmap derived from the raw channel geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalScale {
    /// Nanometers covered by one raw channel pixel.
    pub nm_per_px: f64,
    /// Physical width of the bitmap in nanometers.
    pub total_nm: f64,
}

impl PhysicalScale {
    /// Derive the scale of a bitmap `image_width` pixels wide.
    ///
    /// `raw_pixel_width` is the channel's own pixel width, not the bitmap's:
    /// the physical scale of the measurement is defined by the raw data.
    ///
    /// # Errors
    /// Returns [`Error::InvalidScale`] when the scan range is not a positive
    /// finite number or the raw pixel width is zero.
    pub fn new(scan_range_nm: f64, raw_pixel_width: u32, image_width: u32) -> Result<Self> {
        if !(scan_range_nm.is_finite() && scan_range_nm > 0.0) || raw_pixel_width == 0 {
            return Err(Error::InvalidScale {
                scan_range_nm,
                pixel_width: raw_pixel_width,
            });
        }
        let nm_per_px = scan_range_nm / f64::from(raw_pixel_width);
        Ok(Self {
            nm_per_px,
            total_nm: f64::from(image_width) * nm_per_px,
        })
    }

    /// Bitmap pixels spanned by `length_nm`.
    #[must_use]
    pub fn pixels_for(&self, length_nm: u32) -> f64 {
        f64::from(length_nm) / self.nm_per_px
    }
}
