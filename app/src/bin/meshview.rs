//! Headless model inspection tool.
//!
//! Loads a glTF asset (or every asset in a directory) through the same
//! pipeline the viewer uses and reports what the GPU layer would receive:
//! vertex totals, bounding box, and the bucketed draw order.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use meshview_app::library;
use meshview_app::viewer::fit_transform;
use meshview_core::gltf::{load_model, Model};
use meshview_core::render::split_passes;

/// Inspect glTF assets the way the viewer loads them.
#[derive(Parser)]
#[command(name = "meshview", version)]
struct Args {
    /// A .gltf/.glb file, or a directory to scan for them.
    path: PathBuf,

    /// Also list every draw span.
    #[arg(long)]
    spans: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let paths = if args.path.is_dir() {
        match library::scan_models(&args.path) {
            Ok(paths) if paths.is_empty() => {
                eprintln!("no .gltf/.glb files in {}", args.path.display());
                return ExitCode::FAILURE;
            }
            Ok(paths) => paths,
            Err(e) => {
                eprintln!("cannot scan {}: {e}", args.path.display());
                return ExitCode::FAILURE;
            }
        }
    } else {
        vec![args.path.clone()]
    };

    let mut failures = 0;
    for path in &paths {
        match load_model(path) {
            Ok(model) => report(path, &model, args.spans),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(path: &Path, model: &Model, list_spans: bool) {
    let passes = split_passes(&model.spans);

    println!("{}", path.display());
    println!(
        "  {} vertices, {} triangles, {} textures",
        model.vertex_count(),
        model.triangle_count(),
        model.textures.len()
    );
    println!(
        "  bounds min ({:.3}, {:.3}, {:.3}) max ({:.3}, {:.3}, {:.3})",
        model.bounds.min.x,
        model.bounds.min.y,
        model.bounds.min.z,
        model.bounds.max.x,
        model.bounds.max.y,
        model.bounds.max.z
    );
    println!(
        "  draw order: {} opaque, then {} blended",
        passes.opaque.len(),
        passes.blended.len()
    );

    let fit = fit_transform(&model.bounds);
    println!("  fit scale {:.5}", fit[(0, 0)]);

    if list_spans {
        for (pass, spans) in [("opaque", &passes.opaque), ("blended", &passes.blended)] {
            for span in spans {
                println!(
                    "  [{pass}] vertices {}..{} texture={:?} base_color={:?}",
                    span.start,
                    span.start + span.count,
                    span.texture.map(|t| t.index()),
                    span.base_color
                );
            }
        }
    }
}
