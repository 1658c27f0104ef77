//! Slide page grid geometry.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows and columns of images on one slide page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideGrid {
    pub rows: u32,
    pub columns: u32,
}

impl SlideGrid {
    /// Grid for a requested image count: 1, 2, 4, 6 and 9 have their own
    /// layouts, anything else uses 2x2.
    #[must_use]
    pub fn for_images_per_slide(images_per_slide: usize) -> Self {
        let (rows, columns) = match images_per_slide {
            1 => (1, 1),
            2 => (1, 2),
            6 => (2, 3),
            9 => (3, 3),
            _ => (2, 2),
        };
        Self { rows, columns }
    }

    /// Number of cells on a page.
    #[must_use]
    pub fn capacity(&self) -> usize {
        (self.rows * self.columns) as usize
    }
}

/// Configuration for slide page export.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SlideDeckConfig {
    /// Requested images per page (default: 4).
    pub images_per_slide: usize,
    /// Page width in pixels (default: 2000).
    pub page_width: u32,
    /// Page height in pixels (default: 2000).
    pub page_height: u32,
    /// Margin around and between cells (default: 60).
    pub margin: u32,
    /// Extra vertical spacing between rows (default: 20).
    pub row_spacing: u32,
    /// Image extensions picked up from the input directory (default: bmp).
    pub extensions: Vec<String>,
}

impl Default for SlideDeckConfig {
    fn default() -> Self {
        Self {
            images_per_slide: 4,
            page_width: 2000,
            page_height: 2000,
            margin: 60,
            row_spacing: 20,
            extensions: vec!["bmp".to_string()],
        }
    }
}

impl SlideDeckConfig {
    /// Set the requested images per page.
    #[must_use]
    pub fn with_images_per_slide(mut self, images_per_slide: usize) -> Self {
        self.images_per_slide = images_per_slide;
        self
    }

    #[must_use]
    pub fn grid(&self) -> SlideGrid {
        SlideGrid::for_images_per_slide(self.images_per_slide)
    }

    /// Size of one cell as `(width, height)`, at least one pixel each.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        let grid = self.grid();
        let width = self
            .page_width
            .saturating_sub((grid.columns + 1) * self.margin)
            / grid.columns;
        let height = self
            .page_height
            .saturating_sub((grid.rows + 1) * self.margin)
            / grid.rows;
        (width.max(1), height.max(1))
    }

    /// Top-left corner of the cell for the `slot`-th image on a page.
    #[must_use]
    pub fn cell_origin(&self, slot: usize) -> (u32, u32) {
        let grid = self.grid();
        let (cell_w, cell_h) = self.cell_size();
        let slot = u32::try_from(slot % grid.capacity()).unwrap_or(0);
        let row = slot / grid.columns;
        let column = slot % grid.columns;
        (
            self.margin + column * (cell_w + self.margin),
            self.margin + row * (cell_h + self.margin + self.row_spacing),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_mapping() {
        let grid = |n| {
            let g = SlideGrid::for_images_per_slide(n);
            (g.rows, g.columns)
        };
        assert_eq!(grid(1), (1, 1));
        assert_eq!(grid(2), (1, 2));
        assert_eq!(grid(4), (2, 2));
        assert_eq!(grid(6), (2, 3));
        assert_eq!(grid(9), (3, 3));
        assert_eq!(grid(5), (2, 2));
        assert_eq!(grid(0), (2, 2));
    }

    #[test]
    fn test_cell_geometry() {
        let config = SlideDeckConfig::default();
        assert_eq!(config.cell_size(), (910, 910));
        assert_eq!(config.cell_origin(0), (60, 60));
        assert_eq!(config.cell_origin(1), (1030, 60));
        assert_eq!(config.cell_origin(2), (60, 1050));
        assert_eq!(config.cell_origin(3), (1030, 1050));
        // wraps onto the next page
        assert_eq!(config.cell_origin(4), (60, 60));
    }

    #[test]
    fn test_six_per_slide() {
        let config = SlideDeckConfig::default().with_images_per_slide(6);
        assert_eq!(config.grid().capacity(), 6);
        assert_eq!(config.cell_size(), (586, 910));
        assert_eq!(config.cell_origin(5), (60 + 2 * 646, 1050));
    }
}
