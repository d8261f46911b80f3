//! GPU collaborator interface and the model draw driver.
//!
//! The core hands the GPU layer a flat vertex buffer for one bulk upload and
//! an ordered draw-span list for per-span draw calls; [`ModelRenderer`]
//! owns the resulting handles and enforces the resource and pass-order
//! contracts so backends stay simple.

use meshview_core::gltf::{Model, TextureData, Vertex};
use meshview_core::render::{split_passes, DrawPasses};

/// Handle to an uploaded vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferId(pub u64);

/// Handle to an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Which draw pass a sequence of calls belongs to.
///
/// `Opaque` is drawn with depth writes enabled and blending disabled;
/// `Blended` with depth writes disabled and standard alpha blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Opaque,
    Blended,
}

/// One draw call: a contiguous vertex range with its per-span uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub first: u32,
    pub count: u32,
    /// Texture to bind, or None to draw untextured.
    pub texture: Option<TextureId>,
    /// Base color factor uniform.
    pub base_color: [f32; 4],
}

/// Global rasterizer state the viewer toggles control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFlags {
    pub wireframe: bool,
    pub cull_backfaces: bool,
    pub lighting: bool,
}

/// Interface the GPU layer implements.
///
/// Upload calls return opaque handles the backend owns until the matching
/// release call; the driver guarantees release happens before any handle is
/// recreated and that passes arrive in opaque-then-blended order, ending
/// with [`RenderBackend::restore_state`].
pub trait RenderBackend {
    fn upload_vertices(&mut self, vertices: &[Vertex]) -> VertexBufferId;
    fn release_vertices(&mut self, buffer: VertexBufferId);

    fn upload_texture(&mut self, texture: &TextureData) -> TextureId;
    fn release_texture(&mut self, texture: TextureId);

    fn set_flags(&mut self, flags: RenderFlags);
    fn begin_pass(&mut self, pass: PassKind);
    fn draw(&mut self, buffer: VertexBufferId, call: &DrawCall);
    fn restore_state(&mut self);
}

/// Owns one model's GPU resources and drives its draw sequence.
///
/// Uploading a new model always tears the previous one down first, so a
/// model swap never leaks driver handles.
#[derive(Debug, Default)]
pub struct ModelRenderer {
    buffer: Option<VertexBufferId>,
    textures: Vec<TextureId>,
    opaque: Vec<DrawCall>,
    blended: Vec<DrawCall>,
}

impl ModelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload a flattened model, replacing any previous one.
    pub fn upload(&mut self, backend: &mut dyn RenderBackend, model: &Model) {
        self.teardown(backend);

        self.textures = model
            .textures
            .iter()
            .map(|texture| backend.upload_texture(texture))
            .collect();
        self.buffer = Some(backend.upload_vertices(&model.vertices));

        let DrawPasses { opaque, blended } = split_passes(&model.spans);
        let opaque_calls = opaque.iter().map(|s| call_for(&self.textures, s)).collect();
        let blended_calls = blended.iter().map(|s| call_for(&self.textures, s)).collect();
        self.opaque = opaque_calls;
        self.blended = blended_calls;

        log::debug!(
            "uploaded model: {} vertices, {} opaque + {} blended spans, {} textures",
            model.vertex_count(),
            self.opaque.len(),
            self.blended.len(),
            self.textures.len()
        );
    }

    /// Release all GPU resources. Safe to call when nothing is uploaded.
    pub fn teardown(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(buffer) = self.buffer.take() {
            backend.release_vertices(buffer);
        }
        for texture in self.textures.drain(..) {
            backend.release_texture(texture);
        }
        self.opaque.clear();
        self.blended.clear();
    }

    /// Draw the current model: opaque pass, blended pass, state restore.
    pub fn draw(&self, backend: &mut dyn RenderBackend, flags: RenderFlags) {
        let Some(buffer) = self.buffer else {
            return;
        };

        backend.set_flags(flags);
        backend.begin_pass(PassKind::Opaque);
        for call in &self.opaque {
            backend.draw(buffer, call);
        }
        backend.begin_pass(PassKind::Blended);
        for call in &self.blended {
            backend.draw(buffer, call);
        }
        backend.restore_state();
    }

    pub fn is_uploaded(&self) -> bool {
        self.buffer.is_some()
    }
}

fn call_for(textures: &[TextureId], span: &meshview_core::gltf::DrawSpan) -> DrawCall {
    DrawCall {
        first: span.start,
        count: span.count,
        texture: span.texture.map(|handle| textures[handle.index()]),
        base_color: span.base_color,
    }
}
