use crate::device::{DeviceError, GpuDevice, TextureDesc};
use crate::math::{self, Float3, Float4x4};
use crate::scene::{MeshIndices, SceneSlot};

use super::frame::{DrawCall, DrawRange, DrawUniforms, FramePass, FrameReport, FrameStatus, TextureBinding};
use super::transform::{Perspective, Transforms};
use super::{DrawSurface, RendererConfig};

/// Lifecycle of a [`Renderer`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RendererState {
    /// Created; no device bound. Frames are ignored.
    Uninitialized,
    /// Device bound, fallback texture allocated, no frame drawn yet.
    Ready,
    /// Steady state.
    Rendering,
    /// Projection is being recomputed for a new surface size.
    Resizing,
    /// Terminal. Frames are ignored.
    Disposed,
}

/// Draws the current scene once per frame tick.
///
/// The renderer reads the scene through a [`SceneSlot`] and never owns mesh
/// resources; the only GPU resource it owns is the fallback texture bound for
/// meshes without a base-color texture.
pub struct Renderer<D: GpuDevice> {
    scene: SceneSlot<D>,
    config: RendererConfig,
    state: RendererState,

    perspective: Perspective,
    transforms: Transforms,

    fallback: Option<D::Texture>,

    frames: u64,
    elapsed: f32,

    // Mesh indices already reported as skipped, per scene generation.
    warned_generation: u64,
    warned: Vec<usize>,
}

impl<D: GpuDevice> Renderer<D> {
    pub fn new(scene: SceneSlot<D>, config: RendererConfig) -> Self {
        let perspective = Perspective {
            fov_y: config.fov_y_radians,
            aspect: 1.0,
            z_near: config.z_near,
            z_far: config.z_far,
        };
        Self {
            scene,
            transforms: Transforms::new(perspective.matrix()),
            perspective,
            config,
            state: RendererState::Uninitialized,
            fallback: None,
            frames: 0,
            elapsed: 0.0,
            warned_generation: 0,
            warned: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> RendererState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &SceneSlot<D> {
        &self.scene
    }

    fn set_state(&mut self, next: RendererState) {
        if self.state != next {
            log::debug!("renderer: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Binds the device and allocates the fallback texture.
    ///
    /// Only meaningful once; later calls are ignored.
    pub fn bind_device(&mut self, device: &D) -> Result<(), DeviceError> {
        if self.state != RendererState::Uninitialized {
            log::debug!("renderer: bind_device ignored in state {:?}", self.state);
            return Ok(());
        }

        let px = self.config.fallback_color.to_srgba8();
        let fallback = device.create_texture(&TextureDesc {
            label: "lumen fallback texture",
            width: 1,
            height: 1,
            rgba8: &px,
        })?;

        self.fallback = Some(fallback);
        self.set_state(RendererState::Ready);
        Ok(())
    }

    /// The texture bound for meshes without their own. `None` until bound.
    pub fn fallback_texture(&self) -> Option<&D::Texture> {
        self.fallback.as_ref()
    }

    // ── transforms ───────────────────────────────────────────────────────

    #[inline]
    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    #[inline]
    pub fn model_matrix(&self) -> Float4x4 {
        self.transforms.model
    }

    #[inline]
    pub fn view_matrix(&self) -> Float4x4 {
        self.transforms.view
    }

    #[inline]
    pub fn projection_matrix(&self) -> Float4x4 {
        self.transforms.projection
    }

    #[inline]
    pub fn camera_position(&self) -> Float3 {
        self.transforms.camera_position
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.perspective.aspect
    }

    pub fn set_model_matrix(&mut self, model: Float4x4) {
        self.transforms.model = model;
    }

    pub fn set_view_matrix(&mut self, view: Float4x4) {
        self.transforms.view = view;
    }

    pub fn set_camera_position(&mut self, position: Float3) {
        self.transforms.camera_position = position;
    }

    /// Sets the view matrix and camera position together.
    pub fn look_at(&mut self, eye: Float3, target: Float3, up: Float3) {
        self.transforms.view = math::look_at(eye, target, up);
        self.transforms.camera_position = eye;
    }

    pub fn set_perspective(&mut self, fov_y_radians: f32, z_near: f32, z_far: f32) {
        self.perspective.fov_y = fov_y_radians;
        self.perspective.z_near = z_near;
        self.perspective.z_far = z_far;
        self.transforms.projection = self.perspective.matrix();
    }

    /// Recomputes the projection for a new drawable size.
    ///
    /// The next frame is guaranteed to use `width / height`. A zero-sized
    /// surface keeps the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == RendererState::Disposed {
            return;
        }

        let resume = self.state;
        let steady = matches!(resume, RendererState::Ready | RendererState::Rendering);
        if steady {
            self.set_state(RendererState::Resizing);
        }

        match math::aspect_ratio(width, height) {
            Some(aspect) => {
                self.perspective.aspect = aspect;
                self.transforms.projection = self.perspective.matrix();
                log::debug!("renderer: resized to {width}x{height} (aspect {aspect:.4})");
            }
            None => log::debug!("renderer: zero-sized surface {width}x{height}; keeping aspect"),
        }

        if steady {
            self.set_state(resume);
        }
    }

    // ── frame ────────────────────────────────────────────────────────────

    /// Frames drawn so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Sum of the frame deltas passed to [`on_frame`](Self::on_frame).
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Draws every mesh of the current scene, in order, into `surface`.
    pub fn on_frame(&mut self, surface: &mut impl DrawSurface<D>, dt: Option<f32>) -> FrameReport {
        match self.state {
            RendererState::Uninitialized => return FrameReport::idle(FrameStatus::NotReady),
            RendererState::Disposed => return FrameReport::idle(FrameStatus::Disposed),
            RendererState::Ready | RendererState::Rendering | RendererState::Resizing => {}
        }
        let Some(fallback) = self.fallback.as_ref() else {
            return FrameReport::idle(FrameStatus::NotReady);
        };

        // One snapshot per frame; held until submission is done.
        let scene = self.scene.snapshot();
        let transforms = self.transforms;
        let light = self.config.light_direction.normalize_or_zero();

        let mut draws = Vec::with_capacity(scene.len());
        let mut skipped = Vec::new();

        for (i, mesh) in scene.meshes().iter().enumerate() {
            if let Err(e) = mesh.validate(i) {
                skipped.push(e);
                continue;
            }

            let range = match mesh.indices() {
                MeshIndices::Indexed { buffer, format, count } => DrawRange::Indexed {
                    buffer,
                    format: *format,
                    count: *count,
                },
                MeshIndices::NonIndexed => DrawRange::Vertices {
                    count: mesh.vertex_count(),
                },
            };

            let texture = match mesh.base_color_texture() {
                Some(t) => TextureBinding::Mesh(t),
                None => TextureBinding::Fallback(fallback),
            };

            let model = transforms.model_for(mesh.transform());
            let normal = Float4x4::from_mat3(math::normal_matrix(&model));

            draws.push(DrawCall {
                mesh: i,
                label: mesh.label(),
                topology: mesh.topology(),
                vertex_buffer: mesh.vertex_buffer(),
                range,
                texture,
                uniforms: DrawUniforms {
                    mvp: transforms.mvp(model).to_cols_array_2d(),
                    model: model.to_cols_array_2d(),
                    normal: normal.to_cols_array_2d(),
                    camera_position: transforms.camera_position.extend(1.0).to_array(),
                    light_direction: light.extend(0.0).to_array(),
                },
            });
        }

        let pass = FramePass {
            clear_color: self.config.clear_color,
            draws,
        };
        surface.submit(&pass);
        let drawn = pass.draws.len();
        drop(pass);

        self.report_skipped(scene.generation(), &skipped);

        self.frames += 1;
        self.elapsed += dt.unwrap_or(0.0);
        self.set_state(RendererState::Rendering);

        FrameReport {
            status: FrameStatus::Drawn,
            drawn,
            skipped,
            generation: scene.generation(),
        }
    }

    fn report_skipped(&mut self, generation: u64, skipped: &[crate::scene::InvalidMeshState]) {
        if generation != self.warned_generation {
            self.warned_generation = generation;
            self.warned.clear();
        }
        for e in skipped {
            if !self.warned.contains(&e.mesh) {
                log::warn!("{e}");
                self.warned.push(e.mesh);
            }
        }
    }

    /// Releases the fallback texture. Terminal.
    pub fn dispose(&mut self) {
        if self.state == RendererState::Disposed {
            return;
        }
        self.fallback = None;
        self.set_state(RendererState::Disposed);
    }
}
