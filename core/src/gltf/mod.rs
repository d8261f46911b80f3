//! glTF 2.0 model loading.
//!
//! Flattens a hierarchical, indexed, multi-primitive, multi-material glTF
//! asset into a [`Model`]: one flat world-space triangle list plus a draw
//! span per primitive/material combination, ready for a single GPU upload
//! and per-span draw calls.
//!
//! Supports binary glTF (`.glb`), JSON glTF with embedded data URIs, and
//! JSON glTF with sibling buffer/image files resolved relative to the asset.
//!
//! # Failure semantics
//!
//! Individual malformed primitives (unsupported topology, missing POSITION,
//! unreadable accessors, bad indices) are logged and skipped so the rest of
//! the asset still loads. The load as a whole fails only when the document
//! cannot be parsed, a buffer cannot be resolved, or zero triangles were
//! produced across the entire asset.
//!
//! # Example
//!
//! ```ignore
//! use meshview_core::gltf::load_model;
//!
//! let model = load_model("assets/helmet.glb".as_ref())?;
//! println!("{} triangles, {} draw spans", model.triangle_count(), model.spans.len());
//! ```

mod accessor;
mod error;
mod loader;
#[cfg(test)]
mod tests;
pub mod types;

pub use error::GltfError;
pub use types::*;

use std::path::Path;

/// Load and flatten a glTF asset from a file path.
///
/// `.glb` and `.gltf` are both accepted; sibling buffer and image files are
/// resolved relative to the asset's directory.
pub fn load_model(path: &Path) -> Result<Model, GltfError> {
    let data = std::fs::read(path)?;
    load_model_from_slice(&data, path.parent())
}

/// Load and flatten a glTF asset already in memory.
///
/// `base_dir` is used to resolve external buffer and image URIs; pass None
/// for self-contained assets (GLB or data-URI glTF).
pub fn load_model_from_slice(data: &[u8], base_dir: Option<&Path>) -> Result<Model, GltfError> {
    let mut gltf = gltf_dep::Gltf::from_slice(data)?;
    let blob = gltf.blob.take();

    let buffers = loader::resolve_buffers(&gltf.document, blob, base_dir)?;
    let mut ctx = loader::LoadContext::new(&gltf.document, &buffers, base_dir);
    ctx.flatten();
    ctx.into_model()
}
