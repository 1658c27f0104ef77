//! Tiling annotated bitmaps into slide pages.
//!
//! Each page is a fixed-size white raster with the images laid out on the
//! grid of [`SlideDeckConfig`]. Images are stretched to their cell.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use spmpix_core::SlideDeckConfig;

use crate::correlate::list_files_with_extensions;
use crate::validate::display_name;
use crate::{Error, Result};

const PAGE_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Write slide pages for the images in `image_dir` into `output_dir` as
/// `slide_001.png`, `slide_002.png`, ... and return their paths.
///
/// An image that cannot be loaded is logged and leaves its cell empty.
///
/// # Errors
/// Returns an error if `image_dir` cannot be listed, `output_dir` cannot be
/// created, or a page cannot be written.
pub fn export_slides(
    image_dir: &Path,
    output_dir: &Path,
    config: &SlideDeckConfig,
) -> Result<Vec<PathBuf>> {
    let images = list_files_with_extensions(image_dir, &config.extensions)?;
    if images.is_empty() {
        log::warn!("No BMP files found in {}", image_dir.display());
        return Ok(Vec::new());
    }
    fs::create_dir_all(output_dir).map_err(|e| Error::at(output_dir, e))?;

    let per_page = config.grid().capacity();
    let (cell_w, cell_h) = config.cell_size();
    let mut pages = Vec::new();

    for (page_index, chunk) in images.chunks(per_page).enumerate() {
        let mut page = RgbImage::from_pixel(config.page_width, config.page_height, PAGE_BACKGROUND);

        for (slot, path) in chunk.iter().enumerate() {
            let picture = match image::open(path) {
                Ok(picture) => picture.to_rgb8(),
                Err(e) => {
                    log::warn!("Could not insert {}: {e}", display_name(path));
                    continue;
                }
            };
            let cell = imageops::resize(&picture, cell_w, cell_h, FilterType::Triangle);
            let (x, y) = config.cell_origin(slot);
            imageops::overlay(&mut page, &cell, i64::from(x), i64::from(y));
        }

        let page_path = output_dir.join(format!("slide_{:03}.png", page_index + 1));
        page.save(&page_path)?;
        pages.push(page_path);
    }

    log::info!(
        "Saved {} slide page(s) for {} image(s) to {}",
        pages.len(),
        images.len(),
        output_dir.display()
    );
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bitmap(dir: &Path, name: &str, color: [u8; 3]) {
        RgbImage::from_pixel(30, 30, Rgb(color))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_pages_and_placement() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_bitmap(images.path(), &format!("img_{i}.bmp"), [200, 0, 0]);
        }

        let config = SlideDeckConfig {
            page_width: 400,
            page_height: 400,
            margin: 20,
            row_spacing: 0,
            ..SlideDeckConfig::default()
        };
        let pages = export_slides(images.path(), out.path(), &config).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], out.path().join("slide_001.png"));

        let first = image::open(&pages[0]).unwrap().to_rgb8();
        assert_eq!(first.dimensions(), (400, 400));
        assert_eq!(*first.get_pixel(5, 5), PAGE_BACKGROUND);
        assert_eq!(*first.get_pixel(100, 100), Rgb([200, 0, 0]));

        // Only one image on the second page: bottom-right cell stays empty.
        let second = image::open(&pages[1]).unwrap().to_rgb8();
        assert_eq!(*second.get_pixel(100, 100), Rgb([200, 0, 0]));
        assert_eq!(*second.get_pixel(300, 300), PAGE_BACKGROUND);
    }

    #[test]
    fn test_broken_image_is_skipped() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(images.path().join("a_broken.bmp"), b"garbage").unwrap();
        write_bitmap(images.path(), "b_good.bmp", [0, 0, 200]);

        let config = SlideDeckConfig::default().with_images_per_slide(2);
        let pages = export_slides(images.path(), out.path(), &config).unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_no_images() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let pages = export_slides(images.path(), out.path(), &SlideDeckConfig::default()).unwrap();
        assert!(pages.is_empty());
    }
}
