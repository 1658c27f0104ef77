//! Locating preview bitmaps for channel files.

use std::fs;
use std::path::{Path, PathBuf};

use spmpix_core::correlate::stem_matches;

use crate::{Error, Result};

/// List files in `dir` whose extension is one of `extensions`
/// (case-insensitive), sorted by file name.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn list_files_with_extensions(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::at(dir, e))? {
        let path = entry.map_err(|e| Error::at(dir, e))?.path();
        let wanted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if wanted && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Find the bitmaps in `dir` whose normalized stem contains the normalized
/// stem of `channel_file`, in file name order.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn find_matching_bitmaps(
    channel_file: &Path,
    dir: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let channel_stem = file_stem(channel_file);
    Ok(list_files_with_extensions(dir, extensions)?
        .into_iter()
        .filter(|bitmap| stem_matches(&channel_stem, &file_stem(bitmap)))
        .collect())
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmp() -> Vec<String> {
        vec!["bmp".to_string()]
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_single_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "image01_preview.bmp");
        touch(dir.path(), "other.bmp");

        let matches = find_matching_bitmaps(Path::new("Image 01.int"), dir.path(), &bmp()).unwrap();
        assert_eq!(matches, vec![dir.path().join("image01_preview.bmp")]);
    }

    #[test]
    fn test_multiple_matches_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "TopoFwd_b.bmp");
        touch(dir.path(), "Scan TopoFwd.BMP");
        touch(dir.path(), "TopoFwd.int");
        touch(dir.path(), "TopoFwd.png");

        let matches = find_matching_bitmaps(&dir.path().join("TopoFwd.int"), dir.path(), &bmp())
            .unwrap();
        assert_eq!(
            matches,
            vec![
                dir.path().join("Scan TopoFwd.BMP"),
                dir.path().join("TopoFwd_b.bmp"),
            ]
        );
    }

    #[test]
    fn test_no_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ItFwd.bmp");
        let matches = find_matching_bitmaps(Path::new("TopoFwd.int"), dir.path(), &bmp()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(find_matching_bitmaps(Path::new("a.int"), &missing, &bmp()).is_err());
    }
}
