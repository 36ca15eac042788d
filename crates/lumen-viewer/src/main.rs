mod app;
mod args;
mod camera;

use clap::Parser;
use lumen_engine::device::GpuInit;
use lumen_engine::logging;
use lumen_engine::window::Runtime;

use crate::app::ViewerApp;
use crate::args::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.logging_config());

    let app = ViewerApp::new(&args);
    Runtime::run(args.runtime_config(), GpuInit::default(), app)
}
