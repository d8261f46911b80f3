//! Orbit camera and perspective projection.
//!
//! [`OrbitCamera`] parameterizes the view by a look-at target, two angles
//! and a distance instead of a raw eye position. Every mutator recomputes
//! the cached view matrix immediately, so consumers always read a matrix
//! consistent with the current parameters.

use crate::math::{self, Mat4, Vec3};

/// Pitch stays just inside +/- pi/2 so the up vector never becomes parallel
/// to the view direction.
const PITCH_LIMIT: f32 = 1.55;

/// Radius floor; the eye must never coincide with the target.
const MIN_RADIUS: f32 = 0.05;

/// Pan speed per pixel, multiplied by the current radius so panning covers
/// the same screen-space distance at any zoom level.
const PAN_SENSITIVITY: f32 = 0.002;

/// Perspective projection state with a cached matrix.
///
/// The matrix is recomputed whenever a parameter changes; resizes only touch
/// the aspect ratio.
#[derive(Debug, Clone)]
pub struct Projection {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    matrix: Mat4,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }
}

impl Projection {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y,
            aspect,
            near,
            far,
            matrix: math::perspective_rh(fov_y, aspect, near, far),
        }
    }

    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.recompute();
    }

    /// Update the aspect ratio (called on window resize).
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.recompute();
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    fn recompute(&mut self) {
        self.matrix = math::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }
}

/// Orbit camera: target point, yaw/pitch angles, and distance (radius).
///
/// Yaw rotates about the world up axis, pitch tilts toward it. The view
/// matrix is a pure function of the four parameters and is kept in sync by
/// every mutator.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    radius: f32,
    view: Mat4,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut camera = Self {
            target: Vec3::zeros(),
            yaw: 0.6,
            pitch: 0.6,
            radius: 3.0,
            view: Mat4::identity(),
        };
        camera.update_view();
        camera
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.update_view();
    }

    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_view();
    }

    pub fn add_yaw_pitch(&mut self, d_yaw: f32, d_pitch: f32) {
        self.set_yaw_pitch(self.yaw + d_yaw, self.pitch + d_pitch);
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(MIN_RADIUS);
        self.update_view();
    }

    pub fn add_radius(&mut self, delta: f32) {
        self.set_radius(self.radius + delta);
    }

    /// Move the target along the camera-local right/up plane.
    ///
    /// `dx`/`dy` are cursor deltas in pixels; the step is proportional to
    /// the current radius so panning feels the same at any zoom level.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.direction();
        let right = forward.cross(&Vec3::y()).normalize();
        let up = right.cross(&forward).normalize();
        let step = self.radius * PAN_SENSITIVITY;
        self.target += right * (dx * step) + up * (dy * step);
        self.update_view();
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Eye position derived from the orbit parameters.
    pub fn eye(&self) -> Vec3 {
        self.target - self.direction() * self.radius
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Unit vector from the eye toward the target (spherical to Cartesian).
    fn direction(&self) -> Vec3 {
        let (cy, sy) = (self.yaw.cos(), self.yaw.sin());
        let (cp, sp) = (self.pitch.cos(), self.pitch.sin());
        Vec3::new(cp * cy, sp, cp * sy)
    }

    fn update_view(&mut self) {
        self.view = math::look_at_rh(&self.eye(), &self.target, &Vec3::y());
    }
}
