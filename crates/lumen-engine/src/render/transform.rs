use crate::math::{self, Float3, Float4x4};

/// Camera and model transforms read by every draw in a frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transforms {
    pub model: Float4x4,
    pub view: Float4x4,
    pub projection: Float4x4,
    pub camera_position: Float3,
}

/// Perspective parameters; the projection matrix is derived from these.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Perspective {
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Perspective {
    pub fn matrix(&self) -> Float4x4 {
        math::perspective(self.fov_y, self.aspect, self.z_near, self.z_far)
    }
}

impl Transforms {
    pub(crate) fn new(projection: Float4x4) -> Self {
        let camera_position = Float3::new(0.0, 0.0, 3.0);
        Self {
            model: Float4x4::IDENTITY,
            view: math::look_at(camera_position, Float3::ZERO, Float3::Y),
            projection,
            camera_position,
        }
    }

    /// Full model transform for a mesh carrying its own node transform.
    #[inline]
    pub fn model_for(&self, mesh_transform: Float4x4) -> Float4x4 {
        self.model * mesh_transform
    }

    #[inline]
    pub fn mvp(&self, model: Float4x4) -> Float4x4 {
        self.projection * self.view * model
    }
}
