//! Wires the runtime callbacks to the loader, the renderer and the camera.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use lumen_engine::assets::{AssetLoader, LoaderConfig};
use lumen_engine::coords::SurfaceSize;
use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::device::{Gpu, WgpuDevice};
use lumen_engine::input::Key;
use lumen_engine::math::Float3;
use lumen_engine::render::{FrameStatus, MeshPass, Renderer};
use lumen_engine::scene::SceneSlot;

use crate::args::Args;
use crate::camera::OrbitCamera;

pub struct ViewerApp {
    model: PathBuf,
    loader_config: LoaderConfig,
    loader: Option<Arc<AssetLoader<WgpuDevice>>>,
    /// Set while a worker thread is loading.
    loading: Arc<AtomicBool>,

    scene: SceneSlot<WgpuDevice>,
    renderer: Renderer<WgpuDevice>,
    mesh_pass: MeshPass,

    camera: OrbitCamera,
    fov_y: f32,
    framed_generation: Option<u64>,
}

impl ViewerApp {
    pub fn new(args: &Args) -> Self {
        let scene = SceneSlot::new();
        let renderer_config = args.renderer_config();
        let fov_y = renderer_config.fov_y_radians;

        Self {
            model: args.model.clone(),
            loader_config: args.loader_config(),
            loader: None,
            loading: Arc::new(AtomicBool::new(false)),
            renderer: Renderer::new(scene.clone(), renderer_config),
            scene,
            mesh_pass: MeshPass::new(),
            camera: OrbitCamera::new(!args.fixed_camera),
            fov_y,
            framed_generation: None,
        }
    }

    /// Loads the model on a worker thread. Ignored while a load is running.
    fn spawn_load(&self) {
        let Some(loader) = self.loader.clone() else {
            return;
        };
        if self.loading.swap(true, Ordering::AcqRel) {
            log::info!("load already in progress");
            return;
        }

        let path = self.model.clone();
        let loading = Arc::clone(&self.loading);
        let spawned = std::thread::Builder::new()
            .name("lumen-loader".into())
            .spawn(move || {
                match loader.load(&path) {
                    Ok(summary) => log::debug!("scene generation {} ready", summary.generation),
                    Err(err) => log::error!("failed to load {}: {err}", path.display()),
                }
                loading.store(false, Ordering::Release);
            });

        if let Err(err) = spawned {
            log::error!("failed to start loader thread: {err}");
            self.loading.store(false, Ordering::Release);
        }
    }

    fn update_camera(&mut self, ctx: &FrameCtx<'_, '_>) {
        let generation = self.scene.generation();
        if self.framed_generation != Some(generation) {
            let scene = self.scene.snapshot();
            self.camera.frame(&scene.bounds(), self.fov_y);
            self.framed_generation = Some(generation);
        }

        self.camera.update(ctx.input, ctx.input_frame, ctx.time.dt);

        let (near, far) = self.camera.clip_planes();
        self.renderer.set_perspective(self.fov_y, near, far);
        self.renderer.look_at(self.camera.eye(), self.camera.target, Float3::Y);
    }
}

impl App for ViewerApp {
    fn on_gpu_ready(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let device = Arc::clone(gpu.wgpu_device());
        self.renderer
            .bind_device(&device)
            .context("failed to create the fallback texture")?;

        let size = gpu.size();
        self.renderer.resize(size.width, size.height);

        self.loader = Some(Arc::new(AssetLoader::new(
            device,
            self.scene.clone(),
            self.loader_config.clone(),
        )));
        self.spawn_load();
        Ok(())
    }

    fn on_resize(&mut self, size: SurfaceSize) {
        self.renderer.resize(size.width, size.height);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            self.renderer.dispose();
            return AppControl::Exit;
        }
        if ctx.input_frame.key_pressed(Key::R) {
            log::info!("reloading {}", self.model.display());
            self.spawn_load();
        }

        self.update_camera(ctx);

        let dt = ctx.time.dt;
        let (renderer, mesh_pass) = (&mut self.renderer, &mut self.mesh_pass);
        let control = ctx.render(|rctx, target| {
            let mut surface = mesh_pass.surface(rctx, target);
            let report = renderer.on_frame(&mut surface, dt);
            if report.status != FrameStatus::Drawn {
                log::trace!("frame not drawn: {:?}", report.status);
            }
        });

        if control == AppControl::Exit {
            self.renderer.dispose();
        }
        control
    }
}
