//! Scene flattening tests: traversal, transforms, materials, and bucketing.

use super::{buffer_json, floats, load, triangle_asset, u16s, TRIANGLE};
use crate::gltf::{GltfError, TextureHandle};
use crate::math::Vec3;
use crate::render::split_passes;

/// 1x1 RGBA PNG, the usual placeholder pixel.
const ONE_PIXEL_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[test]
fn single_triangle_round_trip() {
    let model = load(&triangle_asset()).unwrap();

    assert_eq!(model.vertex_count(), 3);
    assert_eq!(model.triangle_count(), 1);
    assert_eq!(model.spans.len(), 1);

    let span = model.spans[0];
    assert_eq!(span.start, 0);
    assert_eq!(span.count, 3);
    assert_eq!(span.texture, None);
    assert!(!span.blend);
    assert_eq!(span.base_color, [1.0, 1.0, 1.0, 1.0]);

    // Bounds equal the triangle's own corners.
    assert_eq!(model.bounds.min, Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(model.bounds.max, Vec3::new(1.0, 1.0, 0.0));

    for (i, vertex) in model.vertices.iter().enumerate() {
        assert_eq!(vertex.position, [TRIANGLE[3 * i], TRIANGLE[3 * i + 1], TRIANGLE[3 * i + 2]]);
        // Counter-clockwise seen from +Z: the flat fallback normal is +Z.
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        // No COLOR_0: uniform default gray.
        assert_eq!(vertex.color, [0.75, 0.75, 0.75]);
        assert_eq!(vertex.uv, [0.0, 0.0]);
    }
}

#[test]
fn flattening_twice_is_bit_identical() {
    let json = triangle_asset();
    let a = load(&json).unwrap();
    let b = load(&json).unwrap();
    assert_eq!(a.vertices, b.vertices);
    assert_eq!(a.spans, b.spans);
    assert_eq!(a.bounds, b.bounds);
}

#[test]
fn parent_translation_composes_with_child_scale() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "nodes": [
    {{"translation": [1.0, 0.0, 0.0], "children": [1]}},
    {{"mesh": 0, "scale": [2.0, 2.0, 2.0]}}
  ],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.vertex_count(), 3);
    // Local origin lands at the parent translation; local (1,0,0) is scaled
    // by 2 before translating.
    assert_eq!(model.vertices[0].position, [1.0, 0.0, 0.0]);
    assert_eq!(model.vertices[1].position, [3.0, 0.0, 0.0]);
    assert_eq!(model.vertices[2].position, [1.0, 2.0, 0.0]);
}

#[test]
fn explicit_matrix_is_column_major() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "nodes": [{{"mesh": 0,
             "matrix": [1.0, 0.0, 0.0, 0.0,
                        0.0, 1.0, 0.0, 0.0,
                        0.0, 0.0, 1.0, 0.0,
                        5.0, 6.0, 7.0, 1.0]}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.vertices[0].position, [5.0, 6.0, 7.0]);
}

#[test]
fn indexed_quad_expands_to_six_vertices() {
    let positions = floats(&[
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 1.0, 0.0,
    ]);
    let indices = u16s(&[0, 1, 2, 2, 1, 3]);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{pos_buffer}, {index_buffer}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": {pos_len}}},
    {{"buffer": 1, "byteOffset": 0, "byteLength": {index_len}}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
    {{"bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR"}}
  ],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1}}]}}],
  "nodes": [{{"mesh": 0}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        pos_buffer = buffer_json(&positions),
        index_buffer = buffer_json(&indices),
        pos_len = positions.len(),
        index_len = indices.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.vertex_count(), 6);
    assert_eq!(model.spans.len(), 1);
    assert_eq!(model.spans[0].count, 6);
    // Second triangle starts at the shared corner (0, 1, 0).
    assert_eq!(model.vertices[3].position, [0.0, 1.0, 0.0]);
    assert_eq!(model.vertices[5].position, [1.0, 1.0, 0.0]);
}

#[test]
fn asset_without_scenes_flattens_every_mesh() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}]
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.vertex_count(), 3);
    assert_eq!(model.vertices[1].position, [1.0, 0.0, 0.0]);
}

#[test]
fn declared_default_scene_wins() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "nodes": [{{}}, {{"mesh": 0}}],
  "scenes": [{{"nodes": [0]}}, {{"nodes": [1]}}],
  "scene": 1
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    // Scene 0 holds only an empty node; geometry comes from scene 1.
    let model = load(&json).unwrap();
    assert_eq!(model.vertex_count(), 3);
}

#[test]
fn repeated_scene_root_is_visited_once() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "nodes": [{{"mesh": 0}}],
  "scenes": [{{"nodes": [0, 0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.vertex_count(), 3);
    assert_eq!(model.spans.len(), 1);
}

#[test]
fn non_triangle_primitives_leave_nothing_to_draw() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "mode": 1}}]}}],
  "nodes": [{{"mesh": 0}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let err = load(&json).unwrap_err();
    assert!(matches!(err, GltfError::NoGeometry), "got {err:?}");
}

#[test]
fn unparseable_data_is_a_parse_error() {
    let err = load("definitely not gltf").unwrap_err();
    assert!(matches!(err, GltfError::Parse(_)), "got {err:?}");
}

#[test]
fn external_buffer_without_base_dir_fails_buffer_resolution() {
    let json = r#"{
  "asset": {"version": "2.0"},
  "buffers": [{"uri": "mesh.bin", "byteLength": 36}]
}"#;
    let err = load(json).unwrap_err();
    assert!(matches!(err, GltfError::Buffer(_)), "got {err:?}");
}

#[test]
fn vertex_colors_vec4_drop_alpha() {
    let positions = floats(&TRIANGLE);
    let colors = floats(&[
        1.0, 0.0, 0.0, 0.5, //
        0.0, 1.0, 0.0, 0.5, //
        0.0, 0.0, 1.0, 0.5,
    ]);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{pos_buffer}, {color_buffer}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": {pos_len}}},
    {{"buffer": 1, "byteOffset": 0, "byteLength": {color_len}}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
    {{"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC4"}}
  ],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0, "COLOR_0": 1}}}}]}}],
  "nodes": [{{"mesh": 0}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        pos_buffer = buffer_json(&positions),
        color_buffer = buffer_json(&colors),
        pos_len = positions.len(),
        color_len = colors.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.vertices[0].color, [1.0, 0.0, 0.0]);
    assert_eq!(model.vertices[1].color, [0.0, 1.0, 0.0]);
    assert_eq!(model.vertices[2].color, [0.0, 0.0, 1.0]);
}

#[test]
fn authored_normals_transform_by_inverse_transpose() {
    // Scale (2, 1, 1): a +X normal must stay +X after renormalization, and
    // an oblique normal must bend the opposite way from the geometry.
    let positions = floats(&TRIANGLE);
    let normals = floats(&[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{pos_buffer}, {normal_buffer}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": {pos_len}}},
    {{"buffer": 1, "byteOffset": 0, "byteLength": {normal_len}}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
    {{"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3"}}
  ],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0, "NORMAL": 1}}}}]}}],
  "nodes": [{{"mesh": 0, "scale": [2.0, 1.0, 1.0]}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        pos_buffer = buffer_json(&positions),
        normal_buffer = buffer_json(&normals),
        pos_len = positions.len(),
        normal_len = normals.len()
    );

    let model = load(&json).unwrap();
    for vertex in &model.vertices {
        assert!((vertex.normal[0] - 1.0).abs() < 1e-6);
        assert!(vertex.normal[1].abs() < 1e-6);
        assert!(vertex.normal[2].abs() < 1e-6);
    }
    // Positions did scale.
    assert_eq!(model.vertices[1].position, [2.0, 0.0, 0.0]);
}

#[test]
fn blended_child_buckets_after_opaque_parent() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "materials": [
    {{"pbrMetallicRoughness": {{"baseColorFactor": [1.0, 1.0, 1.0, 1.0]}}}},
    {{"pbrMetallicRoughness": {{"baseColorFactor": [1.0, 0.0, 0.0, 0.5]}}, "alphaMode": "BLEND"}}
  ],
  "meshes": [
    {{"primitives": [{{"attributes": {{"POSITION": 0}}, "material": 0}}]}},
    {{"primitives": [{{"attributes": {{"POSITION": 0}}, "material": 1}}]}}
  ],
  "nodes": [
    {{"mesh": 0, "children": [1]}},
    {{"mesh": 1, "translation": [0.0, 0.0, 1.0]}}
  ],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.spans.len(), 2);
    assert!(!model.spans[0].blend);
    assert!(model.spans[1].blend);
    assert_eq!(model.spans[1].base_color, [1.0, 0.0, 0.0, 0.5]);

    // Spans partition the vertex buffer without gaps or overlaps.
    assert_eq!(model.spans[0].start, 0);
    assert_eq!(model.spans[0].count, 3);
    assert_eq!(model.spans[1].start, 3);
    assert_eq!(model.spans[1].count, 3);

    let passes = split_passes(&model.spans);
    assert_eq!(passes.opaque, vec![model.spans[0]]);
    assert_eq!(passes.blended, vec![model.spans[1]]);
}

#[test]
fn blended_parent_still_buckets_after_opaque_child() {
    // Same pair, but the blended primitive is encountered first: bucketing
    // must separate by blend flag, not traversal position.
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "materials": [
    {{"pbrMetallicRoughness": {{"baseColorFactor": [1.0, 1.0, 1.0, 1.0]}}}},
    {{"pbrMetallicRoughness": {{"baseColorFactor": [0.0, 0.0, 1.0, 0.25]}}, "alphaMode": "BLEND"}}
  ],
  "meshes": [
    {{"primitives": [{{"attributes": {{"POSITION": 0}}, "material": 1}}]}},
    {{"primitives": [{{"attributes": {{"POSITION": 0}}, "material": 0}}]}}
  ],
  "nodes": [
    {{"mesh": 0, "children": [1]}},
    {{"mesh": 1}}
  ],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len()
    );

    let model = load(&json).unwrap();
    assert_eq!(model.spans.len(), 2);

    let passes = split_passes(&model.spans);
    assert_eq!(passes.opaque.len(), 1);
    assert_eq!(passes.blended.len(), 1);
    assert!(passes.blended[0].blend);
    assert_eq!(passes.opaque[0].start, 3);
    assert_eq!(passes.blended[0].start, 0);
}

#[test]
fn texture_transform_applies_to_default_uvs_and_caches_decodes() {
    let positions = floats(&TRIANGLE);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "extensionsUsed": ["KHR_texture_transform"],
  "buffers": [{buffer}],
  "bufferViews": [{{"buffer": 0, "byteOffset": 0, "byteLength": {len}}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}],
  "images": [{{"uri": "data:image/png;base64,{png}"}}],
  "textures": [{{"source": 0}}],
  "materials": [{{"pbrMetallicRoughness": {{"baseColorTexture": {{
    "index": 0,
    "extensions": {{"KHR_texture_transform": {{"offset": [0.5, 0.25]}}}}
  }}}}}}],
  "meshes": [{{"primitives": [
    {{"attributes": {{"POSITION": 0}}, "material": 0}},
    {{"attributes": {{"POSITION": 0}}, "material": 0}}
  ]}}],
  "nodes": [{{"mesh": 0}}],
  "scenes": [{{"nodes": [0]}}],
  "scene": 0
}}"#,
        buffer = buffer_json(&positions),
        len = positions.len(),
        png = ONE_PIXEL_PNG
    );

    let model = load(&json).unwrap();

    // Two primitives share one glTF texture: decoded exactly once.
    assert_eq!(model.textures.len(), 1);
    assert_eq!(model.spans.len(), 2);
    assert_eq!(model.spans[0].texture, Some(TextureHandle(0)));
    assert_eq!(model.spans[1].texture, Some(TextureHandle(0)));

    let texture = &model.textures[0];
    assert_eq!((texture.width, texture.height), (1, 1));
    assert_eq!(
        texture.pixels.len(),
        (texture.width * texture.height) as usize * texture.format.bytes_per_pixel()
    );

    // No TEXCOORD_0: the transform applies to the (0, 0) default.
    for vertex in &model.vertices {
        assert_eq!(vertex.uv, [0.5, 0.25]);
    }
}
