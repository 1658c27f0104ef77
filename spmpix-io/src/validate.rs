//! Channel file validation.
//!
//! A channel is informative when its byte length is exactly
//! `width * height * 4` and at least one sample is non-zero. Nothing else
//! is inspected: the format has no header or checksum.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::reader::{ChannelFileReader, SAMPLE_BYTES};

/// Result of checking one channel file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelCheck {
    /// Correct size with at least one non-zero sample.
    Informative,
    /// Correct size but every sample is zero.
    Degenerate,
    /// Byte length differs from `width * height * 4`.
    SizeMismatch { expected: u64, actual: u64 },
    /// The file could not be inspected.
    Unreadable(String),
}

impl ChannelCheck {
    #[must_use]
    pub fn is_informative(&self) -> bool {
        matches!(self, Self::Informative)
    }
}

impl fmt::Display for ChannelCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Informative => f.write_str("informative"),
            Self::Degenerate => f.write_str("all zeros"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "invalid size: expected {expected} bytes, found {actual}")
            }
            Self::Unreadable(reason) => write!(f, "unreadable: {reason}"),
        }
    }
}

/// Expected byte length of a `width` x `height` channel, `None` on overflow.
#[must_use]
pub fn expected_channel_bytes(width: u32, height: u32) -> Option<u64> {
    u64::from(width)
        .checked_mul(u64::from(height))?
        .checked_mul(SAMPLE_BYTES as u64)
}

/// Check a channel file against its expected geometry.
///
/// Never fails: I/O problems are reported as [`ChannelCheck::Unreadable`].
/// The file mapping is dropped before returning.
pub fn check_channel_file(path: &Path, width: u32, height: u32) -> ChannelCheck {
    let name = display_name(path);

    let actual = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            log::warn!("Error checking {name}: {e}");
            return ChannelCheck::Unreadable(e.to_string());
        }
    };

    let Some(expected) = expected_channel_bytes(width, height).filter(|&e| e == actual) else {
        let expected = expected_channel_bytes(width, height).unwrap_or(u64::MAX);
        log::warn!("Invalid size: {name} ({actual} bytes, expected {expected})");
        return ChannelCheck::SizeMismatch { expected, actual };
    };

    if expected == 0 {
        return ChannelCheck::Degenerate;
    }

    match ChannelFileReader::open(path) {
        Ok(reader) if reader.has_nonzero_sample() => ChannelCheck::Informative,
        Ok(_) => ChannelCheck::Degenerate,
        Err(e) => {
            log::warn!("Error checking {name}: {e}");
            ChannelCheck::Unreadable(e.to_string())
        }
    }
}

/// Boolean view of [`check_channel_file`].
#[must_use]
pub fn is_informative_channel(path: &Path, width: u32, height: u32) -> bool {
    check_channel_file(path, width, height).is_informative()
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_channel(dir: &Path, name: &str, values: &[f32]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        for v in values {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
        path
    }

    #[test]
    fn test_informative_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut values = vec![0.0_f32; 16];
        values[11] = 3.2e-10;
        let path = write_channel(dir.path(), "TopoFwd.int", &values);

        assert_eq!(check_channel_file(&path, 4, 4), ChannelCheck::Informative);
        assert!(is_informative_channel(&path, 4, 4));
        // Same bytes read with swapped geometry is still the right size.
        assert!(is_informative_channel(&path, 2, 8));
    }

    #[test]
    fn test_all_zero_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_channel(dir.path(), "zeros.int", &[0.0; 16]);

        assert_eq!(check_channel_file(&path, 4, 4), ChannelCheck::Degenerate);
        assert!(!is_informative_channel(&path, 4, 4));
    }

    #[test]
    fn test_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_channel(dir.path(), "short.int", &[1.0; 15]);

        assert_eq!(
            check_channel_file(&path, 4, 4),
            ChannelCheck::SizeMismatch {
                expected: 64,
                actual: 60
            }
        );
        assert!(!is_informative_channel(&path, 4, 4));
        assert!(!is_informative_channel(&path, 8, 8));
    }

    #[test]
    fn test_partial_sample_is_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.int");
        fs::write(&path, [1u8; 65]).unwrap();
        assert!(matches!(
            check_channel_file(&path, 4, 4),
            ChannelCheck::SizeMismatch { .. }
        ));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let check = check_channel_file(&dir.path().join("nope.int"), 4, 4);
        assert!(matches!(check, ChannelCheck::Unreadable(_)));
    }

    #[test]
    fn test_empty_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_channel(dir.path(), "empty.int", &[]);
        assert_eq!(check_channel_file(&path, 0, 4), ChannelCheck::Degenerate);
    }

    #[test]
    fn test_expected_bytes_overflow() {
        assert_eq!(expected_channel_bytes(256, 256), Some(262_144));
        assert!(expected_channel_bytes(u32::MAX, u32::MAX).is_none());
    }
}
