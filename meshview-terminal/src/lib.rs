/// Terminal-based ASCII frontend for the meshview scene model
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use meshview_core::Scene;

pub mod camera;
pub mod renderer;

pub use camera::{Camera, RotationState, ViewPreset};
pub use renderer::{AsciiRenderer, RenderMode};

/// Main application struct for the terminal viewer
///
/// Holds the scene read-only; all interaction manipulates the camera and
/// render mode, never the geometry.
pub struct TerminalApp {
    scene: Scene,
    rotation: RotationState,
    camera: Camera,
    renderer: AsciiRenderer,
    mode: RenderMode,
    running: bool,
}

impl TerminalApp {
    pub fn new(scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let camera = Camera::framing(
            scene.bounding_box().as_ref(),
            u32::from(width),
            u32::from(height),
        );

        Ok(Self {
            scene,
            rotation: RotationState::default(),
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            mode: RenderMode::SolidWireframe,
            running: true,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.render()?;

            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.rotation.rotate(0.1, 0.0, 0.0);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.rotation.rotate(-0.1, 0.0, 0.0);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.rotation.rotate(0.0, -0.1, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.rotation.rotate(0.0, 0.1, 0.0);
                }
                KeyCode::Char('e') => {
                    self.rotation.rotate(0.0, 0.0, 0.1);
                }
                KeyCode::Char('r') => {
                    self.rotation.rotate(0.0, 0.0, -0.1);
                }
                KeyCode::Char('1') => self.set_preset(ViewPreset::Xy),
                KeyCode::Char('2') => self.set_preset(ViewPreset::Xz),
                KeyCode::Char('3') => self.set_preset(ViewPreset::Yz),
                KeyCode::Char('0') => self.set_preset(ViewPreset::Oblique),
                KeyCode::Char('m') => {
                    self.mode = self.mode.cycle();
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn set_preset(&mut self, preset: ViewPreset) {
        self.camera.preset = preset;
        self.rotation.reset();
    }

    fn render(&mut self) -> io::Result<()> {
        // Spin the model about the scene center, not the world origin.
        let center = self.camera.target.coords;
        let model = nalgebra::Matrix4::new_translation(&center)
            * self.rotation.matrix()
            * nalgebra::Matrix4::new_translation(&-center);

        self.renderer.clear();
        self.renderer
            .render_scene(&self.scene, self.mode, &model, &self.camera);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Meshview | {} mesh(es) | mode: {} | 1=XY 2=XZ 3=YZ 0=reset m=mode WASD=rotate q=quit",
                self.scene.len(),
                self.mode.label()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
