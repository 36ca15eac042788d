//! Vector and matrix value types plus the transform helpers the renderer needs.
//!
//! Types are thin aliases over `glam` so they can be fed straight into
//! `bytemuck`-backed GPU structs. Conventions:
//! - right-handed world space, +Y up
//! - column-major matrices, column vectors (`m * v`)
//! - clip-space depth in [0, 1] (wgpu/Metal/Vulkan)

mod bounds;

pub use bounds::Aabb;

pub type Float2 = glam::Vec2;
pub type Float3 = glam::Vec3;
pub type Float4 = glam::Vec4;

pub type Float2x2 = glam::Mat2;
pub type Float3x3 = glam::Mat3;
pub type Float4x4 = glam::Mat4;

/// Right-handed perspective projection with a [0, 1] depth range.
#[inline]
pub fn perspective(fov_y_radians: f32, aspect: f32, z_near: f32, z_far: f32) -> Float4x4 {
    Float4x4::perspective_rh(fov_y_radians, aspect, z_near, z_far)
}

/// Right-handed view matrix looking from `eye` towards `target`.
#[inline]
pub fn look_at(eye: Float3, target: Float3, up: Float3) -> Float4x4 {
    Float4x4::look_at_rh(eye, target, up)
}

/// Width / height, or `None` when either dimension is zero.
#[inline]
pub fn aspect_ratio(width: u32, height: u32) -> Option<f32> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(width as f32 / height as f32)
}

/// Recovers the aspect ratio baked into a perspective matrix.
///
/// For `perspective(fov, a, n, f)` the first two diagonal entries are
/// `cot(fov/2) / a` and `cot(fov/2)`, so their ratio is `a`.
pub fn projection_aspect(projection: &Float4x4) -> f32 {
    let sx = projection.x_axis.x;
    let sy = projection.y_axis.y;
    if sx == 0.0 {
        return 0.0;
    }
    sy / sx
}

/// Inverse-transpose of the upper 3x3, used to transform normals.
///
/// Singular matrices (e.g. a zero scale) fall back to identity. Tiny but
/// invertible scales keep their exact inverse.
pub fn normal_matrix(model: &Float4x4) -> Float3x3 {
    let m = Float3x3::from_mat4(*model);
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        return Float3x3::IDENTITY;
    }
    let inverse = m.inverse();
    if !inverse.is_finite() {
        return Float3x3::IDENTITY;
    }
    inverse.transpose()
}

/// Point on a sphere around `target`.
///
/// `yaw` rotates around +Y starting from +Z, `pitch` lifts towards +Y.
pub fn orbit_position(target: Float3, distance: f32, yaw: f32, pitch: f32) -> Float3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    target + Float3::new(distance * cp * sy, distance * sp, distance * cp * cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn aspect_ratio_rejects_zero() {
        assert_eq!(aspect_ratio(0, 10), None);
        assert_eq!(aspect_ratio(10, 0), None);
        assert_eq!(aspect_ratio(1920, 1080), Some(1920.0 / 1080.0));
    }

    #[test]
    fn projection_aspect_round_trips() {
        for &a in &[0.5_f32, 1.0, 16.0 / 9.0, 3.2] {
            let p = perspective(60f32.to_radians(), a, 0.1, 100.0);
            assert!((projection_aspect(&p) - a).abs() < EPS, "aspect {a}");
        }
    }

    #[test]
    fn perspective_maps_near_plane_to_zero_depth() {
        let p = perspective(1.0, 1.0, 0.5, 50.0);
        let clip = p * Float4::new(0.0, 0.0, -0.5, 1.0);
        assert!((clip.z / clip.w).abs() < EPS);

        let clip = p * Float4::new(0.0, 0.0, -50.0, 1.0);
        assert!((clip.z / clip.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn look_at_moves_target_onto_negative_z() {
        let v = look_at(Float3::new(0.0, 0.0, 5.0), Float3::ZERO, Float3::Y);
        let p = v.transform_point3(Float3::ZERO);
        assert!((p - Float3::new(0.0, 0.0, -5.0)).length() < EPS);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Float4x4::from_scale(Float3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&model) * Float3::new(1.0, 1.0, 0.0);
        // Surface tilted by the x-stretch: its normal leans towards +Y.
        assert!(n.y > n.x);
    }

    #[test]
    fn normal_matrix_singular_is_identity() {
        let model = Float4x4::from_scale(Float3::new(0.0, 1.0, 1.0));
        assert_eq!(normal_matrix(&model), Float3x3::IDENTITY);
    }

    #[test]
    fn normal_matrix_handles_tiny_non_uniform_scale() {
        let model = Float4x4::from_scale(Float3::new(0.001, 0.002, 0.001));
        let m = normal_matrix(&model);
        assert_ne!(m, Float3x3::IDENTITY);
        assert!((m.x_axis.x - 1000.0).abs() / 1000.0 < EPS);
        assert!((m.y_axis.y - 500.0).abs() / 500.0 < EPS);

        // Same lean as the unit-sized stretch, just scaled.
        let n = (m * Float3::new(1.0, 1.0, 0.0)).normalize();
        let unit = (normal_matrix(&Float4x4::from_scale(Float3::new(1.0, 2.0, 1.0)))
            * Float3::new(1.0, 1.0, 0.0))
        .normalize();
        assert!((n - unit).length() < EPS);
    }

    #[test]
    fn orbit_position_keeps_distance() {
        let target = Float3::new(1.0, 2.0, 3.0);
        let p = orbit_position(target, 4.0, 0.7, -0.3);
        assert!(((p - target).length() - 4.0).abs() < EPS);

        let front = orbit_position(Float3::ZERO, 2.0, 0.0, 0.0);
        assert!((front - Float3::new(0.0, 0.0, 2.0)).length() < EPS);
    }
}
