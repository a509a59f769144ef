// SPDX-License-Identifier: GPL-3.0-only

//! Saving sketches to disk

use crate::constants::APP_DIR_NAME;
use crate::errors::AppResult;
use crate::sketch::StrokeSurface;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default folder for saved sketches
///
/// `<pictures>/pinch-sketch`, or the current directory when no pictures
/// directory is known.
pub fn sketch_directory() -> PathBuf {
    dirs::picture_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Timestamped file name, e.g. `SKETCH_20240131_235959.png`
pub fn sketch_filename() -> String {
    format!("SKETCH_{}.png", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Resolve where a sketch should be written
///
/// An existing directory gets a timestamped file inside it; any other path is
/// used as-is. Without a path, the default folder is used.
pub fn resolve_output(output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(sketch_filename()),
        Some(path) => path.to_path_buf(),
        None => sketch_directory().join(sketch_filename()),
    }
}

/// Write the drawing over a white background as PNG
pub fn save_sketch(surface: &StrokeSurface, output: Option<&Path>) -> AppResult<PathBuf> {
    let path = resolve_output(output);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    surface.composite().save(&path)?;
    info!(path = %path.display(), segments = surface.segment_count(), "Sketch saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_format() {
        let name = sketch_filename();
        assert!(name.starts_with("SKETCH_"));
        assert!(name.ends_with(".png"));
        // SKETCH_ + YYYYMMDD_HHMMSS + .png
        assert_eq!(name.len(), 7 + 15 + 4);
    }

    #[test]
    fn test_resolve_explicit_file() {
        let path = Path::new("/tmp/pinch-sketch-test/out.png");
        assert_eq!(resolve_output(Some(path)), path);
    }

    #[test]
    fn test_resolve_directory() {
        let dir = std::env::temp_dir();
        let resolved = resolve_output(Some(&dir));
        assert_eq!(resolved.parent(), Some(dir.as_path()));
    }
}
