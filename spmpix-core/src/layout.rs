//! Annotation layout geometry.
//!
//! Everything here is pure arithmetic on pixel sizes so the renderer only has
//! to paint what these functions place. Coordinates are canvas pixels with the
//! origin at the top-left corner.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::params::ParameterSet;
use crate::scale_bar::{PhysicalScale, ScaleBarConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the annotated canvas.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnotationConfig {
    /// Output canvas width in pixels (default: 1500).
    pub canvas_width: u32,
    /// Output canvas height in pixels (default: 1500).
    pub canvas_height: u32,
    /// Base font size in pixels (default: 28).
    pub font_size: u32,
    /// Share of the canvas the image may fill in each axis (default: 0.9).
    pub fill_fraction: f64,
    /// Scale bar inset from the image's left edge, as a share of its width (default: 0.05).
    pub bar_inset: f64,
    /// Padding inside the metadata box and its outer margin (default: 10).
    pub text_padding: u32,
    /// Extra spacing between metadata lines (default: 6).
    pub line_gap: u32,
    /// Opacity of the metadata box background, 0-255 (default: 230).
    pub box_alpha: u8,
    /// TrueType font to use before trying system fonts.
    pub font_path: Option<PathBuf>,
    /// Scale bar length selection.
    pub scale_bar: ScaleBarConfig,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1500,
            canvas_height: 1500,
            font_size: 28,
            fill_fraction: 0.9,
            bar_inset: 0.05,
            text_padding: 10,
            line_gap: 6,
            box_alpha: 230,
            font_path: None,
            scale_bar: ScaleBarConfig::default(),
        }
    }
}

impl AnnotationConfig {
    /// Set the canvas size.
    #[must_use]
    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Set the base font size.
    #[must_use]
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the preferred TrueType font.
    #[must_use]
    pub fn with_font_path(mut self, font_path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(font_path.into());
        self
    }

    /// Set the scale bar configuration.
    #[must_use]
    pub fn with_scale_bar(mut self, scale_bar: ScaleBarConfig) -> Self {
        self.scale_bar = scale_bar;
        self
    }

    /// Vertical distance between consecutive metadata lines.
    #[must_use]
    pub fn line_height(&self) -> u32 {
        self.font_size + self.line_gap
    }

    /// Check the configuration can produce a canvas.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimensions`] for an empty canvas and
    /// [`Error::ConfigError`] for a fill fraction outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if !(self.fill_fraction > 0.0 && self.fill_fraction <= 1.0) {
            return Err(Error::ConfigError(format!(
                "fill fraction must be in (0, 1], got {}",
                self.fill_fraction
            )));
        }
        Ok(())
    }
}

/// Where the resampled bitmap sits on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Uniform factor from source pixels to canvas pixels.
    pub scale: f64,
}

/// Fit a `src_width` x `src_height` image into the canvas, preserving aspect
/// ratio, and center it.
///
/// # Errors
/// Returns [`Error::InvalidDimensions`] for an empty source image, or the
/// configuration's validation error.
pub fn fit_image(src_width: u32, src_height: u32, config: &AnnotationConfig) -> Result<Placement> {
    config.validate()?;
    if src_width == 0 || src_height == 0 {
        return Err(Error::InvalidDimensions {
            width: src_width,
            height: src_height,
        });
    }

    let canvas_w = f64::from(config.canvas_width);
    let canvas_h = f64::from(config.canvas_height);
    let scale = (canvas_w * config.fill_fraction / f64::from(src_width))
        .min(canvas_h * config.fill_fraction / f64::from(src_height));

    let width = ((f64::from(src_width) * scale) as u32).clamp(1, config.canvas_width);
    let height = ((f64::from(src_height) * scale) as u32).clamp(1, config.canvas_height);

    Ok(Placement {
        x: (config.canvas_width - width) / 2,
        y: (config.canvas_height - height) / 2,
        width,
        height,
        scale,
    })
}

/// Scale bar and label position on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBarLayout {
    /// Physical length shown by the bar.
    pub length_nm: u32,
    /// Left edge of the bar.
    pub x: i64,
    /// Top edge of the bar.
    pub y: i64,
    pub width: u32,
    pub thickness: u32,
    /// Top-left corner of the "N nm" label.
    pub label_x: i64,
    pub label_y: i64,
}

impl ScaleBarLayout {
    /// Text drawn above the bar.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} nm", self.length_nm)
    }
}

/// Lay out the scale bar for a bitmap `image_width` source pixels wide.
#[must_use]
pub fn scale_bar_layout(
    placement: &Placement,
    scale: &PhysicalScale,
    config: &AnnotationConfig,
) -> ScaleBarLayout {
    let length_nm = config.scale_bar.select_length(scale.total_nm);
    let width = ((scale.pixels_for(length_nm) * placement.scale) as u32).max(1);
    let thickness = (config.font_size / 2).max(1);
    let font_size = i64::from(config.font_size);

    let x = i64::from(placement.x) + (f64::from(placement.width) * config.bar_inset) as i64;
    let bottom = i64::from(placement.y) + i64::from(placement.height)
        - (f64::from(config.font_size) * 1.5) as i64;
    let y = bottom - i64::from(thickness);

    ScaleBarLayout {
        length_nm,
        x,
        y,
        width,
        thickness,
        label_x: x,
        label_y: y - font_size - 5,
    }
}

/// Metadata box anchored to the canvas's bottom-right corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextBoxLayout {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Offset of the text from the box edges.
    pub padding: u32,
    pub line_height: u32,
}

impl TextBoxLayout {
    /// Top-left corner of line `index`.
    #[must_use]
    pub fn line_origin(&self, index: usize) -> (i64, i64) {
        let padding = i64::from(self.padding);
        (
            self.x + padding,
            self.y + padding + index as i64 * i64::from(self.line_height),
        )
    }
}

/// Size and anchor the metadata box for lines of the given rendered widths.
#[must_use]
pub fn text_box_layout(line_widths: &[u32], config: &AnnotationConfig) -> TextBoxLayout {
    let padding = config.text_padding;
    let line_height = config.line_height();
    let widest = line_widths.iter().copied().max().unwrap_or(0);
    let lines = u32::try_from(line_widths.len()).unwrap_or(u32::MAX);

    let width = widest.saturating_add(2 * padding);
    let height = lines.saturating_mul(line_height).saturating_add(2 * padding);

    TextBoxLayout {
        x: i64::from(config.canvas_width) - i64::from(width) - i64::from(padding),
        y: i64::from(config.canvas_height) - i64::from(height) - i64::from(padding),
        width,
        height,
        padding,
        line_height,
    }
}

/// Build the metadata overlay lines for a bitmap named `stem`.
///
/// Date and time share one line and appear only together. Setpoint current
/// and bias each need both their value and their unit. The stem is always
/// the last line.
#[must_use]
pub fn metadata_lines(params: &ParameterSet, stem: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);

    if let (Some(date), Some(time)) = (params.get("Date"), params.get("Time")) {
        lines.push(format!("{date} {time}"));
    }
    if let (Some(value), Some(unit)) = (params.get("SetPoint"), params.get("SetPointPhysUnit")) {
        lines.push(format!("I: {value} {unit}"));
    }
    if let (Some(value), Some(unit)) = (params.get("Bias"), params.get("BiasPhysUnit")) {
        lines.push(format!("V: {value} {unit}"));
    }
    lines.push(stem.to_string());

    lines
}
