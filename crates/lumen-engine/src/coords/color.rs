/// Linear RGBA color.
///
/// Values are expected in linear space. Conversion to sRGB happens in the
/// render target (the surface and fallback texture use sRGB formats).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Quantizes to 8-bit sRGB-encoded RGBA (alpha stays linear).
    pub fn to_srgba8(self) -> [u8; 4] {
        fn encode(c: f32) -> f32 {
            let c = c.clamp(0.0, 1.0);
            if c <= 0.003_130_8 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            }
        }
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(encode(self.r)), q(encode(self.g)), q(encode(self.b)), q(self.a)]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints() {
        assert_eq!(ColorRgba::black().to_srgba8(), [0, 0, 0, 255]);
        assert_eq!(ColorRgba::white().to_srgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn srgb_clamps_out_of_range() {
        assert_eq!(ColorRgba::new(-1.0, 2.0, 0.0, 0.0).to_srgba8(), [0, 255, 0, 0]);
    }

    #[test]
    fn srgb_mid_grey_brightens() {
        let [r, ..] = ColorRgba::new(0.2, 0.2, 0.2, 1.0).to_srgba8();
        assert!(r > 51, "linear 0.2 should encode above 0.2 * 255, got {r}");
    }
}
