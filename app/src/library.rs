//! Asset directory scanning.
//!
//! Supplies the viewer with its model cycle list: every `.gltf`/`.glb` file
//! directly inside a directory, sorted by name so cycling order is stable
//! across runs.

use std::path::{Path, PathBuf};

/// True for paths the loader accepts.
pub fn is_model_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("gltf") || ext.eq_ignore_ascii_case("glb")
    )
}

/// Collect model files directly inside `dir` (non-recursive), sorted.
pub fn scan_models(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut models = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_model_path(&path) {
            models.push(path);
        }
    }
    models.sort();
    log::debug!("found {} models in {}", models.len(), dir.display());
    Ok(models)
}
