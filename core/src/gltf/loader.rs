//! Internal flattening logic.
//!
//! [`LoadContext`] walks the parsed document's scene graph depth-first,
//! composing world transforms, and bakes every triangle primitive into the
//! shared output buffers: world-space vertices, draw spans, decoded
//! textures, and the running bounding box.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use gltf_dep::accessor::Dimensions;
use gltf_dep::material::AlphaMode;
use gltf_dep::texture as gltf_texture;

use crate::math::{self, Mat4, Vec3};

use super::accessor;
use super::error::GltfError;
use super::types::{
    Aabb, DrawSpan, MagFilter, MinFilter, Model, PixelFormat, SamplerDesc, TextureData,
    TextureHandle, Vertex, WrapMode,
};

/// Fallback vertex color when a primitive has no COLOR_0 attribute.
const DEFAULT_COLOR: [f32; 3] = [0.75, 0.75, 0.75];

/// Flattening state for one load.
pub(crate) struct LoadContext<'a> {
    document: &'a gltf_dep::Document,
    buffers: &'a [Vec<u8>],
    base_dir: Option<&'a Path>,

    vertices: Vec<Vertex>,
    spans: Vec<DrawSpan>,
    textures: Vec<TextureData>,
    bounds: Aabb,

    /// glTF texture index -> decoded handle (None caches a failed decode).
    texture_cache: HashMap<usize, Option<TextureHandle>>,
    /// Guard against cyclic or repeated node references.
    visited: HashSet<usize>,
}

/// Material state resolved for one primitive.
struct ResolvedMaterial {
    base_color: [f32; 4],
    blend: bool,
    texture: Option<TextureHandle>,
    uv_set: u32,
    uv_transform: Option<UvTransform>,
}

impl Default for ResolvedMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            blend: false,
            texture: None,
            uv_set: 0,
            uv_transform: None,
        }
    }
}

/// KHR_texture_transform parameters, applied as scale, then rotation, then
/// offset.
#[derive(Debug, Clone, Copy)]
struct UvTransform {
    scale: [f32; 2],
    rotation: f32,
    offset: [f32; 2],
}

impl UvTransform {
    fn apply(&self, uv: [f32; 2]) -> [f32; 2] {
        let mut u = uv[0] * self.scale[0];
        let mut v = uv[1] * self.scale[1];
        if self.rotation != 0.0 {
            let (s, c) = self.rotation.sin_cos();
            (u, v) = (c * u - s * v, s * u + c * v);
        }
        [u + self.offset[0], v + self.offset[1]]
    }
}

impl<'a> LoadContext<'a> {
    pub fn new(
        document: &'a gltf_dep::Document,
        buffers: &'a [Vec<u8>],
        base_dir: Option<&'a Path>,
    ) -> Self {
        Self {
            document,
            buffers,
            base_dir,
            vertices: Vec::new(),
            spans: Vec::new(),
            textures: Vec::new(),
            bounds: Aabb::default(),
            texture_cache: HashMap::new(),
            visited: HashSet::new(),
        }
    }

    /// Flatten the active scene into the output buffers.
    ///
    /// Uses the declared default scene, falling back to the first scene, or
    /// to every mesh with an identity transform when the asset declares no
    /// scenes at all.
    pub fn flatten(&mut self) {
        let doc = self.document;
        let scene = match doc.default_scene().or_else(|| doc.scenes().next()) {
            Some(scene) => scene,
            None => {
                log::debug!("asset declares no scenes; flattening all meshes untransformed");
                for mesh in doc.meshes() {
                    for primitive in mesh.primitives() {
                        self.append_primitive(&primitive, &Mat4::identity());
                    }
                }
                return;
            }
        };

        for node in scene.nodes() {
            self.visit_node(&node, &Mat4::identity());
        }
    }

    /// Consume the context, failing if the asset produced no triangles.
    pub fn into_model(self) -> Result<Model, GltfError> {
        if self.vertices.is_empty() {
            return Err(GltfError::NoGeometry);
        }
        Ok(Model {
            vertices: self.vertices,
            spans: self.spans,
            textures: self.textures,
            bounds: self.bounds,
        })
    }

    /// Depth-first pre-order traversal, accumulating world transforms.
    fn visit_node(&mut self, node: &gltf_dep::Node<'a>, parent: &Mat4) {
        if !self.visited.insert(node.index()) {
            log::warn!(
                "node {} reached more than once; skipping repeat visit",
                node.index()
            );
            return;
        }

        let world = parent * node_local_transform(node);

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                self.append_primitive(&primitive, &world);
            }
        }

        for child in node.children() {
            self.visit_node(&child, &world);
        }
    }

    /// Bake one primitive: read attributes, resolve the material, emit
    /// world-space triangles, and record a draw span.
    ///
    /// Malformed primitives are skipped without failing the load.
    fn append_primitive(&mut self, primitive: &gltf_dep::Primitive<'a>, world: &Mat4) {
        if primitive.mode() != gltf_dep::mesh::Mode::Triangles {
            log::debug!("skipping primitive with mode {:?}", primitive.mode());
            return;
        }

        let Some(pos_accessor) = primitive.get(&gltf_dep::Semantic::Positions) else {
            log::warn!("skipping primitive without POSITION attribute");
            return;
        };
        if pos_accessor.dimensions() != Dimensions::Vec3 {
            log::warn!("skipping primitive with non-vec3 POSITION");
            return;
        }
        let positions = match accessor::read_vec_n(&pos_accessor, 3, self.buffers) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("skipping primitive: {e}");
                return;
            }
        };
        let vertex_count = positions.len() / 3;

        let normals = self.read_optional(primitive, gltf_dep::Semantic::Normals, Dimensions::Vec3);
        let colors = self.read_colors(primitive);
        let uv0 = self.read_optional(primitive, gltf_dep::Semantic::TexCoords(0), Dimensions::Vec2);
        let uv1 = self.read_optional(primitive, gltf_dep::Semantic::TexCoords(1), Dimensions::Vec2);

        let indices = match primitive.indices() {
            Some(acc) => match accessor::read_indices(&acc, self.buffers) {
                Ok(values) => Some(values),
                Err(e) => {
                    log::warn!("skipping primitive with unreadable indices: {e}");
                    return;
                }
            },
            None => None,
        };
        if let Some(ix) = &indices {
            if ix.iter().any(|&i| i as usize >= vertex_count) {
                log::warn!("skipping primitive with out-of-range indices");
                return;
            }
        }

        let material = self.resolve_material(primitive);
        let normal_mat = math::normal_matrix(world);

        let uv_source = match (material.uv_set, &uv1) {
            (1, Some(_)) => &uv1,
            _ => &uv0,
        };

        let start = self.vertices.len();
        let triangle_count = match &indices {
            Some(ix) => ix.len() / 3,
            None => vertex_count / 3,
        };

        for t in 0..triangle_count {
            let (i0, i1, i2) = match &indices {
                Some(ix) => (
                    ix[3 * t] as usize,
                    ix[3 * t + 1] as usize,
                    ix[3 * t + 2] as usize,
                ),
                None => (3 * t, 3 * t + 1, 3 * t + 2),
            };

            let p0 = math::transform_point(world, position_at(&positions, i0));
            let p1 = math::transform_point(world, position_at(&positions, i1));
            let p2 = math::transform_point(world, position_at(&positions, i2));

            // Flat fallback normal from the world-space edges, guarding the
            // degenerate-triangle case with a vertical unit normal.
            let face_normal = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(1e-10)
                .unwrap_or_else(Vec3::y);

            for (&index, &position) in [i0, i1, i2].iter().zip([p0, p1, p2].iter()) {
                let normal = match &normals {
                    Some(ns) => (normal_mat * position_at(ns, index))
                        .try_normalize(1e-10)
                        .unwrap_or(face_normal),
                    None => face_normal,
                };

                let mut uv = corner_uv(uv_source, index);
                if let Some(transform) = &material.uv_transform {
                    uv = transform.apply(uv);
                }

                self.vertices.push(Vertex {
                    position: [position.x, position.y, position.z],
                    normal: [normal.x, normal.y, normal.z],
                    color: corner_color(&colors, index),
                    uv,
                });
                self.bounds.extend(position);
            }
        }

        let added = self.vertices.len() - start;
        if added > 0 {
            self.spans.push(DrawSpan {
                start: start as u32,
                count: added as u32,
                texture: material.texture,
                blend: material.blend,
                base_color: material.base_color,
            });
        }
    }

    /// Read an optional attribute with a fixed arity; failures degrade to
    /// "attribute absent".
    fn read_optional(
        &self,
        primitive: &gltf_dep::Primitive<'a>,
        semantic: gltf_dep::Semantic,
        dimensions: Dimensions,
    ) -> Option<Vec<f32>> {
        let accessor = primitive.get(&semantic)?;
        if accessor.dimensions() != dimensions {
            log::warn!("ignoring attribute {semantic:?} with unexpected arity");
            return None;
        }
        match accessor::read_vec_n(&accessor, dimensions.multiplicity(), self.buffers) {
            Ok(values) => Some(values),
            Err(e) => {
                log::warn!("ignoring attribute {semantic:?}: {e}");
                None
            }
        }
    }

    /// COLOR_0 may be vec3 or vec4; the alpha component is dropped later.
    fn read_colors(&self, primitive: &gltf_dep::Primitive<'a>) -> Option<(Vec<f32>, usize)> {
        let accessor = primitive.get(&gltf_dep::Semantic::Colors(0))?;
        let arity = match accessor.dimensions() {
            Dimensions::Vec3 => 3,
            Dimensions::Vec4 => 4,
            other => {
                log::warn!("ignoring COLOR_0 with dimensions {other:?}");
                return None;
            }
        };
        match accessor::read_vec_n(&accessor, arity, self.buffers) {
            Ok(values) => Some((values, arity)),
            Err(e) => {
                log::warn!("ignoring COLOR_0: {e}");
                None
            }
        }
    }

    /// Resolve base color, alpha mode, and the base color texture with its
    /// UV set and optional KHR_texture_transform.
    fn resolve_material(&mut self, primitive: &gltf_dep::Primitive<'a>) -> ResolvedMaterial {
        let material = primitive.material();
        let pbr = material.pbr_metallic_roughness();

        let mut resolved = ResolvedMaterial {
            base_color: pbr.base_color_factor(),
            blend: matches!(material.alpha_mode(), AlphaMode::Blend),
            ..ResolvedMaterial::default()
        };

        if let Some(info) = pbr.base_color_texture() {
            resolved.uv_set = info.tex_coord();
            if let Some(transform) = info.texture_transform() {
                resolved.uv_transform = Some(UvTransform {
                    scale: transform.scale(),
                    rotation: transform.rotation(),
                    offset: transform.offset(),
                });
                if let Some(set) = transform.tex_coord() {
                    resolved.uv_set = set;
                }
            }
            resolved.texture = self.texture_for(info.texture().index());
        }

        resolved
    }

    /// Look up or decode the texture for a glTF texture index.
    ///
    /// Decodes lazily, once per distinct index; a failed decode is cached as
    /// None so it is not retried for every primitive that references it.
    fn texture_for(&mut self, index: usize) -> Option<TextureHandle> {
        if let Some(&cached) = self.texture_cache.get(&index) {
            return cached;
        }
        let handle = match self.decode_texture(index) {
            Ok(data) => {
                let handle = TextureHandle(self.textures.len());
                self.textures.push(data);
                Some(handle)
            }
            Err(e) => {
                log::warn!("texture {index} unavailable: {e}");
                None
            }
        };
        self.texture_cache.insert(index, handle);
        handle
    }

    fn decode_texture(&self, index: usize) -> Result<TextureData, GltfError> {
        let doc = self.document;
        let texture = doc
            .textures()
            .nth(index)
            .ok_or_else(|| GltfError::Image(format!("texture index {index} out of range")))?;

        let img = texture.source();
        let bytes: Vec<u8> = match img.source() {
            gltf_dep::image::Source::View { view, .. } => {
                let buffer_index = view.buffer().index();
                let data = self.buffers.get(buffer_index).ok_or_else(|| {
                    GltfError::Buffer(format!("image buffer index {buffer_index} out of range"))
                })?;
                let start = view.offset();
                let end = start + view.length();
                if end > data.len() {
                    return Err(GltfError::Buffer(format!(
                        "image view exceeds buffer {buffer_index}"
                    )));
                }
                data[start..end].to_vec()
            }
            gltf_dep::image::Source::Uri { uri, .. } => read_uri(uri, self.base_dir)?,
        };

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| GltfError::Image(format!("image {}: {e}", img.index())))?;

        // Upload format follows the source: keep RGB for alpha-less images.
        let (pixels, width, height, format) = if decoded.color().has_alpha() {
            let rgba = decoded.to_rgba8();
            let (w, h) = rgba.dimensions();
            (rgba.into_raw(), w, h, PixelFormat::Rgba8)
        } else {
            let rgb = decoded.to_rgb8();
            let (w, h) = rgb.dimensions();
            (rgb.into_raw(), w, h, PixelFormat::Rgb8)
        };

        Ok(TextureData {
            pixels,
            width,
            height,
            format,
            sampler: map_sampler(&texture.sampler()),
        })
    }
}

// -- Helper functions --

/// Local transform of one node: an explicit column-major matrix, or T*R*S
/// from the decomposed fields with identity defaults.
fn node_local_transform(node: &gltf_dep::Node) -> Mat4 {
    match node.transform() {
        gltf_dep::scene::Transform::Matrix { matrix } => math::mat4_from_cols(&matrix),
        gltf_dep::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => math::mat4_from_scale_rotation_translation(
            Vec3::new(scale[0], scale[1], scale[2]),
            math::quat_from_array(rotation),
            Vec3::new(translation[0], translation[1], translation[2]),
        ),
    }
}

fn position_at(values: &[f32], index: usize) -> Vec3 {
    Vec3::new(values[3 * index], values[3 * index + 1], values[3 * index + 2])
}

fn corner_color(colors: &Option<(Vec<f32>, usize)>, index: usize) -> [f32; 3] {
    match colors {
        Some((values, arity)) => [
            values[arity * index],
            values[arity * index + 1],
            values[arity * index + 2],
        ],
        None => DEFAULT_COLOR,
    }
}

fn corner_uv(uvs: &Option<Vec<f32>>, index: usize) -> [f32; 2] {
    match uvs {
        Some(values) => [values[2 * index], values[2 * index + 1]],
        None => [0.0, 0.0],
    }
}

fn map_sampler(sampler: &gltf_texture::Sampler) -> SamplerDesc {
    let defaults = SamplerDesc::default();
    SamplerDesc {
        min_filter: sampler
            .min_filter()
            .map(map_min_filter)
            .unwrap_or(defaults.min_filter),
        mag_filter: sampler
            .mag_filter()
            .map(map_mag_filter)
            .unwrap_or(defaults.mag_filter),
        wrap_s: map_wrapping(sampler.wrap_s()),
        wrap_t: map_wrapping(sampler.wrap_t()),
    }
}

fn map_min_filter(filter: gltf_texture::MinFilter) -> MinFilter {
    match filter {
        gltf_texture::MinFilter::Nearest => MinFilter::Nearest,
        gltf_texture::MinFilter::Linear => MinFilter::Linear,
        gltf_texture::MinFilter::NearestMipmapNearest => MinFilter::NearestMipmapNearest,
        gltf_texture::MinFilter::LinearMipmapNearest => MinFilter::LinearMipmapNearest,
        gltf_texture::MinFilter::NearestMipmapLinear => MinFilter::NearestMipmapLinear,
        gltf_texture::MinFilter::LinearMipmapLinear => MinFilter::LinearMipmapLinear,
    }
}

fn map_mag_filter(filter: gltf_texture::MagFilter) -> MagFilter {
    match filter {
        gltf_texture::MagFilter::Nearest => MagFilter::Nearest,
        gltf_texture::MagFilter::Linear => MagFilter::Linear,
    }
}

fn map_wrapping(wrap: gltf_texture::WrappingMode) -> WrapMode {
    match wrap {
        gltf_texture::WrappingMode::ClampToEdge => WrapMode::ClampToEdge,
        gltf_texture::WrappingMode::MirroredRepeat => WrapMode::MirroredRepeat,
        gltf_texture::WrappingMode::Repeat => WrapMode::Repeat,
    }
}

/// Resolve all buffer data from the document.
///
/// GLB binary chunks come from the container blob; URI buffers may be
/// embedded data URIs or files next to the asset.
pub(crate) fn resolve_buffers(
    document: &gltf_dep::Document,
    mut blob: Option<Vec<u8>>,
    base_dir: Option<&Path>,
) -> Result<Vec<Vec<u8>>, GltfError> {
    let mut buffers = Vec::new();

    for buffer in document.buffers() {
        match buffer.source() {
            gltf_dep::buffer::Source::Bin => {
                let data = blob.take().ok_or_else(|| {
                    GltfError::Buffer("binary buffer referenced but no blob present".into())
                })?;
                buffers.push(data);
            }
            gltf_dep::buffer::Source::Uri(uri) => {
                buffers.push(read_uri(uri, base_dir)?);
            }
        }
    }

    Ok(buffers)
}

/// Fetch bytes for a URI: embedded base64 data, or a file relative to the
/// asset's directory.
fn read_uri(uri: &str, base_dir: Option<&Path>) -> Result<Vec<u8>, GltfError> {
    if let Some(data) = parse_data_uri(uri) {
        return Ok(data);
    }
    match base_dir {
        Some(dir) => Ok(std::fs::read(dir.join(uri))?),
        None => Err(GltfError::Buffer(format!(
            "external URI {uri} requires a base directory"
        ))),
    }
}

/// Parse a `data:<mime>;base64,...` URI.
fn parse_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (_mime, encoded) = rest.split_once(";base64,")?;
    base64_decode(encoded)
}

fn base64_value(byte: u8) -> Option<u32> {
    match byte {
        b'A'..=b'Z' => Some((byte - b'A') as u32),
        b'a'..=b'z' => Some((byte - b'a' + 26) as u32),
        b'0'..=b'9' => Some((byte - b'0' + 52) as u32),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Streaming base64 decoder (avoids pulling in a dependency for one URI
/// scheme). Padding and ASCII whitespace are tolerated.
fn base64_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in input.as_bytes() {
        if matches!(byte, b'=' | b'\n' | b'\r' | b' ' | b'\t') {
            continue;
        }
        acc = (acc << 6) | base64_value(byte)?;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }

    Some(out)
}
