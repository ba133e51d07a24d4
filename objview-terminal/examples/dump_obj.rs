/// Example: Load an OBJ file and print its contents
///
/// Usage: cargo run --example dump_obj -- path/to/file.obj
use std::env;

use anyhow::{bail, Context};
use objview_core::Mesh;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        bail!("usage: dump_obj <obj-file>");
    };

    let mut mesh = Mesh::load(&path).with_context(|| format!("failed to load {path}"))?;
    mesh.calculate_normals();

    println!("{}", mesh.summary());
    println!("{mesh}");
    Ok(())
}
