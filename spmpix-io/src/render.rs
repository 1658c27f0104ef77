//! Annotated figure rendering.
//!
//! The preview bitmap is resampled onto a fixed-size black canvas, a scale bar
//! calibrated from the raw channel geometry is drawn near its bottom-left
//! corner, and a metadata box is anchored to the canvas's bottom-right corner.
//! The result overwrites the bitmap file, which is expected to be a copy.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use spmpix_core::layout::{
    fit_image, metadata_lines, scale_bar_layout, text_box_layout, AnnotationConfig,
    ScaleBarLayout, TextBoxLayout,
};
use spmpix_core::{ParameterSet, PhysicalScale};

use crate::correlate::file_stem;
use crate::font::TextPainter;
use crate::validate::display_name;
use crate::Result;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const FOREGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// What was drawn on one canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationReport {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scale_bar: ScaleBarLayout,
    pub text_box: TextBoxLayout,
    pub lines: Vec<String>,
}

/// Renders annotated canvases with one configuration and one loaded font.
pub struct Annotator {
    config: AnnotationConfig,
    painter: TextPainter,
}

impl Annotator {
    /// Create an annotator, loading the configured font or a fallback.
    #[must_use]
    pub fn new(config: AnnotationConfig) -> Self {
        let painter = TextPainter::load(config.font_path.as_deref());
        Self { config, painter }
    }

    /// Create an annotator with an explicit text painter.
    #[must_use]
    pub fn with_painter(config: AnnotationConfig, painter: TextPainter) -> Self {
        Self { config, painter }
    }

    #[must_use]
    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// Compose the annotated canvas for an in-memory image.
    ///
    /// `stem` is printed as the last metadata line.
    ///
    /// # Errors
    /// Returns an error for an empty image, an invalid canvas configuration,
    /// or a scan range / pixel width that gives no physical scale.
    pub fn compose(
        &self,
        source: &RgbImage,
        scan_range_nm: f64,
        raw_pixel_width: u32,
        params: &ParameterSet,
        stem: &str,
    ) -> Result<(RgbImage, AnnotationReport)> {
        let config = &self.config;
        let placement = fit_image(source.width(), source.height(), config)?;
        let scale = PhysicalScale::new(scan_range_nm, raw_pixel_width, source.width())?;

        let mut canvas = RgbImage::from_pixel(config.canvas_width, config.canvas_height, BACKGROUND);
        let resized = imageops::resize(
            source,
            placement.width,
            placement.height,
            FilterType::CatmullRom,
        );
        imageops::overlay(
            &mut canvas,
            &resized,
            i64::from(placement.x),
            i64::from(placement.y),
        );
        drop(resized);

        let bar = scale_bar_layout(&placement, &scale, config);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(clamp_i32(bar.x), clamp_i32(bar.y)).of_size(bar.width, bar.thickness),
            FOREGROUND,
        );
        self.painter.draw(
            &mut canvas,
            bar.label_x,
            bar.label_y,
            &bar.label(),
            config.font_size,
            FOREGROUND,
        );

        let lines = metadata_lines(params, stem);
        let widths: Vec<u32> = lines
            .iter()
            .map(|line| self.painter.text_width(line, config.font_size))
            .collect();
        let text_box = text_box_layout(&widths, config);
        darken_rect(&mut canvas, &text_box, config.box_alpha);
        for (index, line) in lines.iter().enumerate() {
            let (x, y) = text_box.line_origin(index);
            self.painter
                .draw(&mut canvas, x, y, line, config.font_size, FOREGROUND);
        }

        let report = AnnotationReport {
            canvas_width: canvas.width(),
            canvas_height: canvas.height(),
            scale_bar: bar,
            text_box,
            lines,
        };
        Ok((canvas, report))
    }

    /// Annotate `bitmap` and overwrite it with the composed canvas.
    ///
    /// # Errors
    /// Returns an error if the bitmap cannot be decoded, the scale is invalid,
    /// or the canvas cannot be encoded and written back.
    pub fn render(
        &self,
        bitmap: &Path,
        scan_range_nm: f64,
        raw_pixel_width: u32,
        params: &ParameterSet,
    ) -> Result<AnnotationReport> {
        let source = image::open(bitmap)?.to_rgb8();
        let (canvas, report) = self.compose(
            &source,
            scan_range_nm,
            raw_pixel_width,
            params,
            &file_stem(bitmap),
        )?;
        drop(source);
        canvas.save(bitmap)?;
        Ok(report)
    }

    /// Like [`Annotator::render`], but logs failures instead of returning
    /// them. The bitmap is left untouched when rendering fails.
    pub fn annotate_in_place(
        &self,
        bitmap: &Path,
        scan_range_nm: f64,
        raw_pixel_width: u32,
        params: &ParameterSet,
    ) -> bool {
        match self.render(bitmap, scan_range_nm, raw_pixel_width, params) {
            Ok(_) => {
                log::info!("Final BMP rendered to fixed canvas: {}", display_name(bitmap));
                true
            }
            Err(e) => {
                log::error!("Error rendering fixed canvas for {}: {e}", display_name(bitmap));
                false
            }
        }
    }
}

/// One-shot annotation with a freshly loaded font.
///
/// # Errors
/// See [`Annotator::render`].
pub fn render_annotation(
    bitmap: &Path,
    scan_range_nm: f64,
    raw_pixel_width: u32,
    params: &ParameterSet,
    config: &AnnotationConfig,
) -> Result<AnnotationReport> {
    Annotator::new(config.clone()).render(bitmap, scan_range_nm, raw_pixel_width, params)
}

/// Blend the box area towards black with opacity `alpha`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn darken_rect(canvas: &mut RgbImage, area: &TextBoxLayout, alpha: u8) {
    let keep = u16::from(255 - alpha);
    let x0 = area.x.max(0);
    let y0 = area.y.max(0);
    let x1 = (area.x + i64::from(area.width)).min(i64::from(canvas.width()));
    let y1 = (area.y + i64::from(area.height)).min(i64::from(canvas.height()));

    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            for channel in &mut pixel.0 {
                *channel = (u16::from(*channel) * keep / 255) as u8;
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
