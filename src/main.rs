use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use prism_assets::{read_mesh_from_file, read_texture_from_file, Mesh, Texture};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    for path in &options.inputs {
        inspect(path, options.roundtrip)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }
    Ok(())
}

/// Decodes one asset file and prints a single summary line. With
/// `roundtrip`, a decoded image is re-encoded next to the input so the
/// output can be diffed against it.
fn inspect(path: &Path, roundtrip: bool) -> Result<()> {
    match extension_of(path).as_str() {
        "obj" => {
            let mut mesh = Mesh::new();
            read_mesh_from_file(path, &mut mesh)?;
            println!(
                "{}: {} vertices, {} triangles ({} partition{}), normals: {}, uvs: {}",
                path.display(),
                mesh.vertex_count(),
                mesh.total_triangle_count(),
                mesh.partition_count(),
                if mesh.partition_count() == 1 { "" } else { "s" },
                yes_no(mesh.has_normals()),
                yes_no(mesh.has_uvs()),
            );
        }
        "tga" => {
            let mut texture = Texture::new();
            read_texture_from_file(path, &mut texture)?;
            println!(
                "{}: {}x{} pixels, {} channels",
                path.display(),
                texture.width(),
                texture.height(),
                texture.channels(),
            );
            if roundtrip {
                let out = path.with_extension("out.tga");
                prism_assets::write_texture_to_file(&out, &texture)?;
                println!("{}: re-encoded copy written", out.display());
            }
        }
        other => {
            return Err(anyhow!("no decoder registered for file extension `{other}`"));
        }
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

struct CliOptions {
    inputs: Vec<PathBuf>,
    roundtrip: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut inputs = Vec::new();
        let mut roundtrip = false;
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--roundtrip" => roundtrip = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. Expected --roundtrip"));
                }
                path => inputs.push(PathBuf::from(path)),
            }
        }
        if inputs.is_empty() {
            return Err(anyhow!(
                "Usage: prism-assets <asset.obj|asset.tga>... [--roundtrip]"
            ));
        }
        Ok(Self { inputs, roundtrip })
    }
}
