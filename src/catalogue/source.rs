//! Enumeration of reference images in a directory.

use crate::catalogue::{ImageSource, SourceEntry};
use crate::util::{PixMatchError, PixMatchResult};
use std::path::Path;

/// File extensions (compared case-insensitively) treated as reference images.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Returns true when `path` has a recognized image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Display name for a reference image: its file name without extension.
pub fn display_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.trim().is_empty())
}

/// Lists the image files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Files whose stem is empty are
/// ignored since they cannot be named.
pub fn scan_dir(dir: &Path) -> PixMatchResult<Vec<SourceEntry>> {
    let read = std::fs::read_dir(dir).map_err(|err| PixMatchError::io(dir, err))?;

    let mut paths = Vec::new();
    for item in read {
        let item = item.map_err(|err| PixMatchError::io(dir, err))?;
        let path = item.path();
        if path.is_file() && is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let name = display_name(&path)?;
            Some(SourceEntry::new(name, ImageSource::Path(path)))
        })
        .collect())
}
