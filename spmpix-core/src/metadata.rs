//! Session metadata parsing.
//!
//! The metadata text has no formal grammar. It is line oriented: a
//! `FileDescBegin` / `FileDescEnd` block lists the channel files as
//! `FileName: <name>` lines, everything else that looks like `key: value`
//! is a parameter. Parsing never fails; a bad line only yields fewer entries.

use crate::error::{Error, Result};
use crate::params::{ParamValue, ParameterSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Marker opening a channel description block.
pub const FILE_DESC_BEGIN: &str = "FileDescBegin";
/// Marker closing a channel description block.
pub const FILE_DESC_END: &str = "FileDescEnd";
/// Line prefix naming a channel file inside a description block.
pub const FILE_NAME_PREFIX: &str = "FileName";

/// Parameter holding the raw channel width in pixels.
pub const X_PIXELS_KEY: &str = "xPixel";
/// Parameter holding the raw channel height in pixels.
pub const Y_PIXELS_KEY: &str = "yPixel";
/// Parameter holding the physical scan width in nanometers.
pub const SCAN_RANGE_KEY: &str = "XScanRange";

/// Parsed content of one metadata file.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metadata {
    /// Every `key: value` line except channel file names; the last write wins.
    pub params: ParameterSet,
    /// Channel file names in order of appearance, duplicates kept.
    pub channels: Vec<String>,
}

impl Metadata {
    /// Raw channel geometry as `(width, height)`, when both are usable.
    #[must_use]
    pub fn pixel_dimensions(&self) -> Option<(u32, u32)> {
        Some((
            self.params.pixel_count(X_PIXELS_KEY)?,
            self.params.pixel_count(Y_PIXELS_KEY)?,
        ))
    }

    /// Like [`Metadata::pixel_dimensions`], naming the first unusable key.
    ///
    /// # Errors
    /// Returns [`Error::MissingParameter`] when `xPixel` or `yPixel` is absent
    /// or not a positive number.
    pub fn require_pixel_dimensions(&self) -> Result<(u32, u32)> {
        let require = |key: &str| {
            self.params
                .pixel_count(key)
                .ok_or_else(|| Error::MissingParameter(key.to_string()))
        };
        Ok((require(X_PIXELS_KEY)?, require(Y_PIXELS_KEY)?))
    }

    /// Physical scan width in nanometers, or `fallback_nm` when absent or
    /// not numeric.
    #[must_use]
    pub fn scan_range_nm(&self, fallback_nm: f64) -> f64 {
        self.params.number(SCAN_RANGE_KEY).unwrap_or(fallback_nm)
    }
}

/// Parse metadata text.
#[must_use]
pub fn parse_metadata(text: &str) -> Metadata {
    let mut metadata = Metadata::default();
    let mut in_file_desc = false;

    // A bare CR also ends a line.
    for line in text.split(&['\r', '\n'][..]).map(str::trim) {
        if line.starts_with(FILE_DESC_BEGIN) {
            in_file_desc = true;
        } else if line.starts_with(FILE_DESC_END) {
            in_file_desc = false;
        } else if in_file_desc && line.starts_with(FILE_NAME_PREFIX) {
            if let Some((_, name)) = line.split_once(':') {
                metadata.channels.push(name.trim().to_string());
            }
        } else if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                metadata.params.insert(key, ParamValue::coerce(value));
            }
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_session() {
        let text = "FileDescBegin\nFileName: a.int\nFileName: b.int\nFileDescEnd\n\
                    xPixel: 256\nyPixel: 256\nBias: 1,5";
        let metadata = parse_metadata(text);

        assert_eq!(metadata.channels, vec!["a.int", "b.int"]);
        assert_eq!(metadata.params.len(), 3);
        assert_eq!(metadata.params.number("xPixel"), Some(256.0));
        assert_eq!(metadata.params.number("yPixel"), Some(256.0));
        assert_eq!(metadata.params.number("Bias"), Some(1.5));
        assert_eq!(metadata.pixel_dimensions(), Some((256, 256)));
    }

    #[test]
    fn test_parse_instrument_style_spacing() {
        let text = "; scan parameters\n\
                    Date        : 03.04.2025\n\
                    Time        : 14:02:11\n\
                    XScanRange  : 50,0\n\
                    \n\
                    FileDescBegin\n\
                    \tFileName  : TopoFwd.int\n\
                    \tCaption   : Topography\n\
                    \tScale     : 1e-9\n\
                    FileDescEnd\n";
        let metadata = parse_metadata(text);

        assert_eq!(metadata.channels, vec!["TopoFwd.int"]);
        assert_eq!(
            metadata.params.get("Time"),
            Some(&ParamValue::Text("14:02:11".to_string()))
        );
        assert_eq!(
            metadata.params.get("Date"),
            Some(&ParamValue::Text("03.04.2025".to_string()))
        );
        assert_eq!(metadata.scan_range_nm(100.0), 50.0);
        // Per-channel keys inside the block are parameters too.
        assert_eq!(
            metadata.params.get("Caption"),
            Some(&ParamValue::Text("Topography".to_string()))
        );
        assert_eq!(metadata.params.number("Scale"), Some(1e-9));
    }

    #[test]
    fn test_multiple_blocks_and_stray_end() {
        let text = "FileDescEnd\nA: 1\nFileDescBegin\nFileName: x.int\nFileDescEnd\n\
                    B: 2\nFileDescBegin\nFileName: y.int\nFileName: x.int\nFileDescEnd\nC: three";
        let metadata = parse_metadata(text);

        assert_eq!(metadata.channels, vec!["x.int", "y.int", "x.int"]);
        assert_eq!(metadata.params.number("A"), Some(1.0));
        assert_eq!(metadata.params.number("B"), Some(2.0));
        assert_eq!(
            metadata.params.get("C"),
            Some(&ParamValue::Text("three".to_string()))
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "no colon here\n: orphan value\nFileDescBegin\nFileName without colon\n\
                    FileDescEnd\nGood: 1";
        let metadata = parse_metadata(text);

        assert!(metadata.channels.is_empty());
        assert_eq!(metadata.params.len(), 1);
        assert_eq!(metadata.params.number("Good"), Some(1.0));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let metadata = parse_metadata("Bias: 1\nBias: 2,25\n");
        assert_eq!(metadata.params.number("Bias"), Some(2.25));
    }

    #[test]
    fn test_missing_dimension() {
        let metadata = parse_metadata("xPixel: 128\n");
        assert_eq!(metadata.pixel_dimensions(), None);
        assert_eq!(
            metadata.require_pixel_dimensions(),
            Err(Error::MissingParameter("yPixel".to_string()))
        );
        assert_eq!(metadata.scan_range_nm(100.0), 100.0);
    }

    #[test]
    fn test_text_scan_range_uses_fallback() {
        let metadata = parse_metadata("XScanRange: unknown\n");
        assert_eq!(metadata.scan_range_nm(100.0), 100.0);
    }

    #[test]
    fn test_block_keys_repeat_last_wins() {
        let text = "FileDescBegin\nFileName: a.int\nCaption: Topo\nPhysUnit: m\nFileDescEnd\n\
                    FileDescBegin\nFileName: b.int\nCaption: Current\nPhysUnit: A\nFileDescEnd\n";
        let metadata = parse_metadata(text);

        assert_eq!(metadata.channels, vec!["a.int", "b.int"]);
        assert_eq!(
            metadata.params.get("Caption"),
            Some(&ParamValue::Text("Current".to_string()))
        );
        assert_eq!(
            metadata.params.get("PhysUnit"),
            Some(&ParamValue::Text("A".to_string()))
        );
        assert!(!metadata.params.contains_key("FileName"));
    }

    #[test]
    fn test_cr_and_crlf_line_endings() {
        let cr = parse_metadata("xPixel: 4\ryPixel: 4\rFileDescBegin\rFileName: a.int\rFileDescEnd\r");
        assert_eq!(cr.pixel_dimensions(), Some((4, 4)));
        assert_eq!(cr.channels, vec!["a.int"]);

        let crlf = parse_metadata("xPixel: 4\r\nyPixel: 2\r\n");
        assert_eq!(crlf.pixel_dimensions(), Some((4, 2)));
        assert_eq!(crlf.params.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_metadata(""), Metadata::default());
    }
}
