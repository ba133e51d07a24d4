/// objview terminal viewer
///
/// Loads an OBJ mesh and spins it in front of the camera.
/// Controls:
///   - Arrow Keys: Pan the camera
///   - Q/A: Move the camera forward/back
///   - ESC: Quit
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use objview_core::Mesh;
use objview_terminal::{TerminalApp, ViewerConfig};

#[derive(Parser, Debug)]
#[command(version, about = "View a Wavefront OBJ mesh in the terminal")]
struct Args {
    /// OBJ file to display
    #[arg(default_value = "teapot.obj")]
    path: PathBuf,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    #[arg(long, default_value_t = 1.0)]
    near: f32,

    #[arg(long, default_value_t = 10000.0)]
    far: f32,

    /// Camera movement per key press
    #[arg(long, default_value_t = 0.1)]
    step: f32,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Use an orthographic projection instead of perspective
    #[arg(long)]
    orthographic: bool,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        ViewerConfig {
            fovy: self.fov,
            near: self.near,
            far: self.far,
            orthographic: self.orthographic,
            step: self.step,
            target_fps: self.fps,
            ..ViewerConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut mesh = Mesh::load(&args.path).with_context(|| format!("failed to load {}", args.path.display()))?;
    mesh.calculate_normals();
    log::info!("{}", mesh.summary());

    let mut app = TerminalApp::new(mesh, args.config()).context("failed to query terminal size")?;
    app.run().context("terminal session failed")?;
    Ok(())
}
