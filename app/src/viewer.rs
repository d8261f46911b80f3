//! Viewer session state.
//!
//! Owns the orbit camera, projection, render option toggles, and the
//! currently loaded model. The windowing layer feeds an [`InputState`] and
//! calls [`Viewer::update`] once per frame; everything else is derived.

use std::path::{Path, PathBuf};

use meshview_core::camera::{OrbitCamera, Projection};
use meshview_core::gltf::{load_model, Aabb, Model};
use meshview_core::input::{InputState, KeyCode, MouseButton};
use meshview_core::math::{self, Mat4, Vec3};

/// Rasterizer toggles, flipped by single key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// F: draw as wireframe.
    pub wireframe: bool,
    /// C: cull back faces.
    pub cull_backfaces: bool,
    /// L: Phong lighting on/off.
    pub lighting: bool,
    /// H: help panel visible.
    pub show_help: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wireframe: false,
            cull_backfaces: false,
            lighting: true,
            show_help: false,
        }
    }
}

/// Camera control tunables and the pose used on reset.
#[derive(Debug, Clone, Copy)]
pub struct CameraSettings {
    /// Orbit speed in radians per pixel of drag.
    pub orbit_sensitivity: f32,
    /// Radius change per scroll notch (wheel up zooms in).
    pub zoom_step: f32,
    pub initial_yaw: f32,
    pub initial_pitch: f32,
    pub initial_radius: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            orbit_sensitivity: 0.005,
            zoom_step: 0.2,
            initial_yaw: 0.6,
            initial_pitch: 0.6,
            initial_radius: 3.0,
        }
    }
}

/// One mouse drag in progress: which button started it and the cursor
/// position at the previous frame.
#[derive(Debug, Clone, Copy)]
struct Drag {
    button: MouseButton,
    last: (f64, f64),
}

/// Viewer session: camera, toggles, model list, and the loaded model.
///
/// A failed load leaves the previous model (and its fit transform) in place
/// and records the error for display.
#[derive(Debug)]
pub struct Viewer {
    camera: OrbitCamera,
    projection: Projection,
    options: RenderOptions,
    settings: CameraSettings,

    paths: Vec<PathBuf>,
    current: usize,
    model: Option<Model>,
    model_transform: Mat4,
    last_error: Option<String>,

    drag: Option<Drag>,
}

impl Viewer {
    /// Create a viewer cycling over `paths`. No model is loaded yet; call
    /// [`Viewer::load_current`] once the GPU side is ready for the upload.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let mut viewer = Self {
            camera: OrbitCamera::new(),
            projection: Projection::default(),
            options: RenderOptions::default(),
            settings: CameraSettings::default(),
            paths,
            current: 0,
            model: None,
            model_transform: Mat4::identity(),
            last_error: None,
            drag: None,
        };
        viewer.reset_camera();
        viewer
    }

    /// Load the model at the current cycle position.
    ///
    /// Returns true when a new model replaced the old one; on failure the
    /// previous model stays and [`Viewer::last_error`] reports why.
    pub fn load_current(&mut self) -> bool {
        let Some(path) = self.paths.get(self.current).cloned() else {
            self.last_error = Some("no models to load".into());
            return false;
        };
        self.load_path(&path)
    }

    fn load_path(&mut self, path: &Path) -> bool {
        log::info!("loading {}", path.display());
        match load_model(path) {
            Ok(model) => {
                self.model_transform = fit_transform(&model.bounds);
                self.model = Some(model);
                self.last_error = None;
                self.reset_camera();
                true
            }
            Err(e) => {
                log::warn!("failed to load {}: {e}", path.display());
                self.last_error = Some(format!("{}: {e}", path.display()));
                false
            }
        }
    }

    /// Advance to the next model in the list and load it.
    pub fn next_model(&mut self) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        self.current = (self.current + 1) % self.paths.len();
        self.load_current()
    }

    /// Go back to the previous model in the list and load it.
    pub fn previous_model(&mut self) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        self.current = (self.current + self.paths.len() - 1) % self.paths.len();
        self.load_current()
    }

    /// Reload the current model from disk.
    pub fn reload(&mut self) -> bool {
        self.load_current()
    }

    /// Restore the camera to its initial framing pose.
    pub fn reset_camera(&mut self) {
        self.camera.set_target(Vec3::zeros());
        self.camera
            .set_yaw_pitch(self.settings.initial_yaw, self.settings.initial_pitch);
        self.camera.set_radius(self.settings.initial_radius);
    }

    /// Consume one frame of input: key toggles, drags, and scroll zoom.
    pub fn update(&mut self, input: &mut InputState) {
        for key in input.take_key_presses() {
            match key {
                KeyCode::F => self.options.wireframe = !self.options.wireframe,
                KeyCode::C => self.options.cull_backfaces = !self.options.cull_backfaces,
                KeyCode::L => self.options.lighting = !self.options.lighting,
                KeyCode::H => self.options.show_help = !self.options.show_help,
                KeyCode::R => self.reset_camera(),
                KeyCode::N => {
                    self.next_model();
                }
                KeyCode::P => {
                    self.previous_model();
                }
                _ => {}
            }
        }

        self.update_drag(input);

        let (_, scroll_y) = input.consume_scroll();
        if scroll_y != 0.0 {
            // Wheel up zooms in.
            self.camera
                .add_radius(-(scroll_y as f32) * self.settings.zoom_step);
        }
    }

    fn update_drag(&mut self, input: &InputState) {
        let cursor = input.cursor();
        let active_button = [MouseButton::Right, MouseButton::Middle]
            .into_iter()
            .find(|&b| input.is_mouse_down(b));

        match (self.drag, active_button) {
            (None, Some(button)) => {
                self.drag = Some(Drag {
                    button,
                    last: cursor,
                });
            }
            (Some(drag), Some(button)) if drag.button == button => {
                let dx = (cursor.0 - drag.last.0) as f32;
                let dy = (cursor.1 - drag.last.1) as f32;
                match button {
                    MouseButton::Right => {
                        let s = self.settings.orbit_sensitivity;
                        self.camera.add_yaw_pitch(-dx * s, -dy * s);
                    }
                    MouseButton::Middle => {
                        // Drag follows the cursor: window y grows downward.
                        self.camera.pan(-dx, dy);
                    }
                    _ => {}
                }
                self.drag = Some(Drag {
                    button,
                    last: cursor,
                });
            }
            (Some(_), Some(button)) => {
                // Switched buttons mid-drag: restart from here.
                self.drag = Some(Drag {
                    button,
                    last: cursor,
                });
            }
            (Some(_), None) => self.drag = None,
            (None, None) => {}
        }
    }

    /// Update the projection for a new framebuffer size.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.projection.set_aspect(width as f32 / height as f32);
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Transform placing the loaded model centered at the origin at unit
    /// size; identity while nothing is loaded.
    pub fn model_transform(&self) -> &Mat4 {
        &self.model_transform
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.paths.get(self.current).map(PathBuf::as_path)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Center the model and scale its longest side to one unit.
///
/// Degenerate bounds (empty or near-zero extent) keep unit scale so a flat
/// or single-point model still shows up where expected.
pub fn fit_transform(bounds: &Aabb) -> Mat4 {
    if !bounds.is_valid() {
        return Mat4::identity();
    }
    let longest = bounds.longest_side();
    let scale = if longest > 1e-6 { 1.0 / longest } else { 1.0 };
    math::mat4_from_scale(Vec3::from_element(scale)) * math::mat4_from_translation(-bounds.center())
}
