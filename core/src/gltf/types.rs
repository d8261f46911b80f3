//! Data types for flattened model output.

use bytemuck::{Pod, Zeroable};

use crate::math::Vec3;

/// One flattened vertex: world-space position and normal, linear color, and
/// transformed texture coordinates. Produced once per triangle corner.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

/// Handle to a decoded texture in [`Model::textures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A contiguous run of vertices sharing one material configuration, drawn
/// with a single draw call.
///
/// Spans appear in traversal-then-primitive encounter order and partition
/// the vertex buffer without gaps or overlaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawSpan {
    /// First vertex of the span.
    pub start: u32,
    /// Number of vertices (a multiple of 3).
    pub count: u32,
    /// Base color texture, if the material references one.
    pub texture: Option<TextureHandle>,
    /// True when the material's alpha mode is BLEND.
    pub blend: bool,
    /// Material base color factor (linear RGBA).
    pub base_color: [f32; 4],
}

/// Axis-aligned bounding box accumulated over emitted vertices.
///
/// Starts at the +inf/-inf sentinel; [`Aabb::is_valid`] is false until the
/// first point is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::from_element(f32::INFINITY),
            max: Vec3::from_element(f32::NEG_INFINITY),
        }
    }
}

impl Aabb {
    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Longest edge of the box, used to fit models to a uniform size.
    pub fn longest_side(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }
}

/// Minification filter, including mipmapped variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

/// Magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Texture coordinate wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    Repeat,
}

/// Sampler settings resolved from the asset, with glTF defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            min_filter: MinFilter::LinearMipmapLinear,
            mag_filter: MagFilter::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
        }
    }
}

/// Pixel layout of a decoded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// A decoded texture ready for GPU upload: tightly packed pixel rows plus
/// the sampler settings to apply.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sampler: SamplerDesc,
}

/// A flattened model: the only data retained once the source document is
/// discarded.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Flat triangle list; every three vertices form one world-space triangle.
    pub vertices: Vec<Vertex>,
    /// Draw spans in encounter order, partitioning `vertices`.
    pub spans: Vec<DrawSpan>,
    /// Decoded textures referenced by spans, indexed by [`TextureHandle`].
    pub textures: Vec<TextureData>,
    /// Bounding box over all emitted vertices, in asset world space.
    pub bounds: Aabb,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}
