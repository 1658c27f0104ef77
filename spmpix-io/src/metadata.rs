//! Reading session metadata files from disk.

use std::fs;
use std::path::Path;

use spmpix_core::metadata::{parse_metadata, Metadata};

use crate::{Error, Result};

/// Read and parse a metadata file.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so only a
/// failure to read the file at all is an error.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_metadata_file(path: &Path) -> Result<Metadata> {
    let bytes = fs::read(path).map_err(|e| Error::at(path, e))?;
    Ok(parse_metadata(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_with_invalid_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");
        let mut bytes = b"Comment: Messung bei 5\xb0K\n".to_vec();
        bytes.extend_from_slice(b"xPixel: 64\r\nyPixel: 32\r\n");
        bytes.extend_from_slice(b"FileDescBegin\r\nFileName: TopoFwd.int\r\nFileDescEnd\r\n");
        fs::write(&path, bytes).unwrap();

        let metadata = read_metadata_file(&path).unwrap();
        assert_eq!(metadata.pixel_dimensions(), Some((64, 32)));
        assert_eq!(metadata.channels, vec!["TopoFwd.int"]);
        assert!(metadata.params.contains_key("Comment"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_metadata_file(&dir.path().join("none.txt")).is_err());
    }
}
