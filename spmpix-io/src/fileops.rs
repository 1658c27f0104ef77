//! Plain file copies into the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Copy `source` into `destination_dir` under the same file name and return
/// the new path. Copying a file onto itself is a no-op.
///
/// # Errors
/// Returns an error if `source` has no file name or the copy fails.
pub fn copy_into(source: &Path, destination_dir: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        Error::InvalidFormat(format!("no file name in {}", source.display()))
    })?;
    let destination = destination_dir.join(name);

    if is_same_file(source, &destination) {
        return Ok(destination);
    }
    fs::copy(source, &destination).map_err(|e| Error::at(source, e))?;
    Ok(destination)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_into() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("a.int");
        fs::write(&source, [1, 2, 3, 4]).unwrap();

        let copied = copy_into(&source, dst_dir.path()).unwrap();
        assert_eq!(copied, dst_dir.path().join("a.int"));
        assert_eq!(fs::read(&copied).unwrap(), vec![1, 2, 3, 4]);
        // source untouched
        assert_eq!(fs::read(&source).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_onto_itself_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, b"xPixel: 4").unwrap();

        let copied = copy_into(&source, dir.path()).unwrap();
        assert_eq!(copied, source);
        assert_eq!(fs::read(&source).unwrap(), b"xPixel: 4");
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(copy_into(&dir.path().join("gone.int"), dir.path()).is_err());
    }
}
