//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use lumen_engine::assets::{LoaderConfig, NormalPolicy, PrimitivePolicy};
use lumen_engine::logging::LoggingConfig;
use lumen_engine::render::RendererConfig;
use lumen_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

/// How to fill normals a primitive does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliNormals {
    /// Derive smooth normals from triangle winding.
    #[default]
    Generate,
    /// Leave them zero; such meshes render unlit.
    Zero,
}

impl From<CliNormals> for NormalPolicy {
    fn from(cli: CliNormals) -> Self {
        match cli {
            CliNormals::Generate => NormalPolicy::Generate,
            CliNormals::Zero => NormalPolicy::Zero,
        }
    }
}

/// Minimal glTF viewer.
///
/// Left-drag rotates, the wheel zooms, R reloads the model and Escape quits.
#[derive(Debug, Clone, Parser)]
#[command(name = "lumen", version, about)]
pub struct Args {
    /// Model to open (.gltf or .glb).
    pub model: PathBuf,

    /// Do not orbit the model automatically.
    #[arg(long)]
    pub fixed_camera: bool,

    /// Drop primitives that fail validation instead of rejecting the model.
    #[arg(long)]
    pub skip_invalid: bool,

    #[arg(long, value_enum, default_value_t = CliNormals::Generate)]
    pub normals: CliNormals,

    /// Vertical field of view in degrees.
    #[arg(long, default_value_t = 60.0, value_parser = parse_fov)]
    pub fov: f32,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Log filter, e.g. "debug" or "lumen_engine=trace" (overrides RUST_LOG).
    #[arg(long)]
    pub log: Option<String>,
}

fn parse_fov(s: &str) -> Result<f32, String> {
    let fov: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if fov > 0.0 && fov < 180.0 {
        Ok(fov)
    } else {
        Err(format!("field of view must be between 0 and 180 degrees, got {fov}"))
    }
}

impl Args {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            primitive_policy: if self.skip_invalid {
                PrimitivePolicy::SkipAndWarn
            } else {
                PrimitivePolicy::Reject
            },
            normal_policy: self.normals.into(),
            ..LoaderConfig::default()
        }
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            fov_y_radians: self.fov.to_radians(),
            ..RendererConfig::default()
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let name = self
            .model
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        RuntimeConfig {
            title: format!("lumen - {name}"),
            initial_size: LogicalSize::new(self.width.max(1) as f64, self.height.max(1) as f64),
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }
}
