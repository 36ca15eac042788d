use crate::coords::ColorRgba;
use crate::math::Float3;

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub clear_color: ColorRgba,
    /// Color of the 1x1 texture bound for meshes without a base-color texture.
    pub fallback_color: ColorRgba,
    pub fov_y_radians: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Direction the light travels (from the light towards the scene).
    pub light_direction: Float3,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::new(0.05, 0.05, 0.07, 1.0),
            fallback_color: ColorRgba::new(0.5, 0.5, 0.5, 1.0),
            fov_y_radians: 60f32.to_radians(),
            z_near: 0.01,
            z_far: 1000.0,
            light_direction: Float3::new(-0.4, -1.0, -0.6),
        }
    }
}
