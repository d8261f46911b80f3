//! Shared helpers for loader tests.
//!
//! Test assets are built in memory as glTF JSON documents with base64
//! data-URI buffers, so every fixture is readable next to the assertions
//! that use it.

use super::error::GltfError;
use super::types::Model;

mod flatten_test;

/// Load a JSON document built by a test.
pub(crate) fn load(json: &str) -> Result<Model, GltfError> {
    super::load_model_from_slice(json.as_bytes(), None)
}

/// Little-endian bytes of a float array.
pub(crate) fn floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a u16 array.
pub(crate) fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a u32 array.
pub(crate) fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Base64-encode bytes (test-side counterpart of the loader's decoder).
pub(crate) fn b64(bytes: &[u8]) -> String {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(3) {
        let b1 = *chunk.first().unwrap() as u32;
        let b2 = chunk.get(1).copied().unwrap_or(0) as u32;
        let b3 = chunk.get(2).copied().unwrap_or(0) as u32;
        let n = (b1 << 16) | (b2 << 8) | b3;
        out.push(TABLE[(n >> 18) as usize & 63] as char);
        out.push(TABLE[(n >> 12) as usize & 63] as char);
        out.push(if chunk.len() > 1 {
            TABLE[(n >> 6) as usize & 63] as char
        } else {
            '='
        });
        out.push(if chunk.len() > 2 {
            TABLE[n as usize & 63] as char
        } else {
            '='
        });
    }
    out
}

/// JSON for one buffer embedding `bytes` as a data URI.
pub(crate) fn buffer_json(bytes: &[u8]) -> String {
    format!(
        r#"{{"uri":"data:application/octet-stream;base64,{}","byteLength":{}}}"#,
        b64(bytes),
        bytes.len()
    )
}

/// The canonical test triangle: (0,0,0), (1,0,0), (0,1,0), counter-clockwise
/// when viewed from +Z.
pub(crate) const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// A complete single-node, single-primitive, non-indexed triangle asset.
pub(crate) fn triangle_asset() -> String {
    let positions = floats(&TRIANGLE);
    format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "nodes": [{{"mesh": 0}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    )
}

#[test]
fn b64_round_trips_through_the_loader_decoder() {
    let bytes: Vec<u8> = (0u8..=255).collect();
    let uri = format!("data:application/octet-stream;base64,{}", b64(&bytes));
    let model = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{{"uri": "{uri}", "byteLength": 256}}]
}}"#
    );
    // Parses and resolves the buffer; no geometry is expected.
    let err = load(&model).unwrap_err();
    assert!(matches!(err, GltfError::NoGeometry), "got {err:?}");
}
