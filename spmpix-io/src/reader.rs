//! Memory-mapped channel file reader.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Bytes per channel sample (`f32`).
pub const SAMPLE_BYTES: usize = 4;

/// A memory-mapped raw channel file.
///
/// The channel format is a flat array of little-endian `f32` samples with no
/// header. The mapping and its file handle are released on drop.
pub struct ChannelFileReader {
    mmap: Mmap,
}

impl ChannelFileReader {
    /// Opens a channel file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::at(path, e))?;
        // SAFETY: Read-only mapping. Channel files are acquisition output and are not
        // written while a session is processed; the map never outlives this reader.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file).map_err(|e| Error::at(path, e))? };
        Ok(Self { mmap })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Number of whole samples in the file.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.mmap.len() / SAMPLE_BYTES
    }

    /// Iterates over the samples. A trailing partial sample is ignored.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.mmap
            .chunks_exact(SAMPLE_BYTES)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    /// True when at least one sample differs from zero.
    ///
    /// `-0.0` compares equal to zero; `NaN` does not.
    #[must_use]
    pub fn has_nonzero_sample(&self) -> bool {
        self.samples().any(|value| value != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_samples(values: &[f32]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for v in values {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_channel_file_reader() {
        let file = write_samples(&[0.0, 1.5, -2.25]);

        let reader = ChannelFileReader::open(file.path()).unwrap();
        assert_eq!(reader.len(), 12);
        assert!(!reader.is_empty());
        assert_eq!(reader.sample_count(), 3);
        assert_eq!(reader.samples().collect::<Vec<_>>(), vec![0.0, 1.5, -2.25]);
        assert!(reader.has_nonzero_sample());
    }

    #[test]
    fn test_zero_samples() {
        let file = write_samples(&[0.0, -0.0, 0.0]);
        let reader = ChannelFileReader::open(file.path()).unwrap();
        assert!(!reader.has_nonzero_sample());
    }

    #[test]
    fn test_nan_counts_as_signal() {
        let file = write_samples(&[0.0, f32::NAN]);
        let reader = ChannelFileReader::open(file.path()).unwrap();
        assert!(reader.has_nonzero_sample());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.int");
        let err = ChannelFileReader::open(&missing).err().unwrap();
        assert!(err.to_string().contains("missing.int"));
    }
}
