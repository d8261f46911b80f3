//! Math type aliases and helper functions.
//!
//! f32 rendering types backed by nalgebra, plus the handful of matrix
//! constructions the loader and camera need.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_array`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
///
/// Composition order is `T * R * S`, matching glTF node semantics.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::new_unchecked(rotation);
    let m = r.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Build a 4x4 matrix from four column arrays (glTF matrix layout).
pub fn mat4_from_cols(cols: &[[f32; 4]; 4]) -> Mat4 {
    let mut flat = [0.0f32; 16];
    for (c, col) in cols.iter().enumerate() {
        flat[c * 4..c * 4 + 4].copy_from_slice(col);
    }
    Mat4::from_column_slice(&flat)
}

/// Build a translation-only 4x4 matrix.
pub fn mat4_from_translation(t: Vec3) -> Mat4 {
    Mat4::new_translation(&t)
}

/// Build a (possibly non-uniform) scaling 4x4 matrix.
pub fn mat4_from_scale(s: Vec3) -> Mat4 {
    Mat4::new_nonuniform_scaling(&s)
}

/// Build a right-handed perspective projection with depth range [-1, 1]
/// (OpenGL convention).
pub fn perspective_rh(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
    let f = 1.0 / (yfov / 2.0).tan();
    let nf = 1.0 / (znear - zfar);
    #[rustfmt::skip]
    let result = Mat4::new(
        f / aspect, 0.0,  0.0,                 0.0,
        0.0,        f,    0.0,                 0.0,
        0.0,        0.0,  (zfar + znear) * nf, 2.0 * zfar * znear * nf,
        0.0,        0.0,  -1.0,                0.0,
    );
    result
}

/// Right-handed look-at view matrix.
pub fn look_at_rh(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
    let eye_point = nalgebra::Point3::from(*eye);
    let target_point = nalgebra::Point3::from(*target);
    nalgebra::Isometry3::look_at_rh(&eye_point, &target_point, up).to_homogeneous()
}

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    nalgebra::Quaternion::new(a[3], a[0], a[1], a[2])
}

/// Transform a 3D point by a 4x4 matrix (w = 1).
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    (m * Vec4::new(p.x, p.y, p.z, 1.0)).xyz()
}

/// Normal matrix for a world transform: inverse-transpose of the 3x3 part.
///
/// Keeps normals perpendicular under non-uniform scale. A singular 3x3 part
/// (zero scale on some axis) falls back to the untransposed 3x3.
pub fn normal_matrix(m: &Mat4) -> Mat3 {
    let linear: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    match linear.try_inverse() {
        Some(inv) => inv.transpose(),
        None => linear,
    }
}
