/// Meshview terminal viewer
///
/// Usage: meshview [path/to/model.stl|model.obj]
///
/// Without an argument the viewer shows a unit cube, like the original
/// startup scene. Controls:
///   - WASD / Arrow Keys: rotate, E/R: roll
///   - 1/2/3: XY / XZ / YZ view, 0: reset view
///   - M: cycle solid / wireframe / both
///   - Q/ESC: quit
use std::env;
use std::process::ExitCode;

use meshview_core::{load_mesh, Mesh, Scene};
use meshview_terminal::TerminalApp;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Build the mesh completely before it ever touches the scene; a failed
    // load leaves the scene alone.
    let mut scene = Scene::new();
    match env::args().nth(1) {
        Some(path) => match load_mesh(&path) {
            Ok(mesh) => {
                tracing::info!(
                    path = %path,
                    vertices = mesh.vertex_count(),
                    faces = mesh.face_count(),
                    "loaded mesh"
                );
                scene.push(mesh);
            }
            Err(err) => {
                eprintln!("failed to load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => scene.push(Mesh::unit_cube()),
    }

    let result = TerminalApp::new(scene).and_then(|mut app| app.run());
    if let Err(err) = result {
        eprintln!("terminal error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
