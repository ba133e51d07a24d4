/// Terminal-based viewer for OBJ meshes
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use objview_core::{BufferAllocator, Camera, Matrix4, Mesh, ProjectionMode, Vector3};
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub mod backend;
pub mod renderer;

pub use backend::SoftwareBackend;
pub use renderer::AsciiRenderer;

/// Viewer settings
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view in degrees
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
    pub orthographic: bool,
    /// Camera translation per key press
    pub step: f32,
    pub target_fps: u32,
    /// How far down -Z the model is placed
    pub model_distance: f32,
    /// Degrees of spin about +Y added every frame
    pub spin_step: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fovy: 60.0,
            near: 1.0,
            far: 10000.0,
            orthographic: false,
            step: 0.1,
            target_fps: 30,
            model_distance: 10.0,
            spin_step: 0.2,
        }
    }
}

impl ViewerConfig {
    fn camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width, height);
        camera.fovy = self.fovy;
        camera.near = self.near;
        camera.far = self.far;
        if self.orthographic {
            camera.mode = ProjectionMode::Orthographic;
        }
        camera
    }
}

/// Application context: everything one running viewer owns
pub struct TerminalApp {
    config: ViewerConfig,
    mesh: Mesh,
    camera: Camera,
    backend: Rc<SoftwareBackend>,
    renderer: AsciiRenderer,
    spin: f32,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Upload `mesh` and size the viewer to the current terminal
    pub fn new(mesh: Mesh, config: ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(mesh, config, width, height))
    }

    pub fn with_size(mut mesh: Mesh, config: ViewerConfig, width: u16, height: u16) -> Self {
        let backend = Rc::new(SoftwareBackend::new());
        let allocator: Rc<dyn BufferAllocator> = backend.clone();
        mesh.create_buffer_objects(&allocator);

        Self {
            camera: config.camera(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            config,
            mesh,
            backend,
            spin: 0.0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_running(&self) -> bool {
        self.running
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
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.config.target_fps.max(1)));

        while self.running {
            let frame_start = Instant::now();

            // Drain pending input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(&event);
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                self.handle_key(code);
            }
            Event::Resize(width, height) => {
                log::debug!("resized to {width}x{height}");
                self.camera.resize(width as u32, height as u32);
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let step = self.config.step;
        match code {
            KeyCode::Esc => self.running = false,
            KeyCode::Right => self.camera.translate(step, 0.0, 0.0),
            KeyCode::Left => self.camera.translate(-step, 0.0, 0.0),
            KeyCode::Up => self.camera.translate(0.0, step, 0.0),
            KeyCode::Down => self.camera.translate(0.0, -step, 0.0),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.camera.translate(0.0, 0.0, -step),
            KeyCode::Char('a') | KeyCode::Char('A') => self.camera.translate(0.0, 0.0, step),
            _ => {}
        }
    }

    /// Advance the model spin, wrapping after a full turn
    pub fn update(&mut self) {
        self.spin += self.config.spin_step;
        if self.spin > 360.0 {
            self.spin = self.config.spin_step;
        }
    }

    /// Model transform for the current frame
    pub fn model_matrix(&self) -> Matrix4 {
        *Matrix4::identity()
            .translate(0.0, 0.0, -self.config.model_distance)
            .rotate(self.spin, Vector3::new(0.0, 1.0, 0.0))
    }

    fn render(&mut self) -> io::Result<()> {
        let model = self.model_matrix();

        self.renderer.clear();
        self.renderer.render_mesh(&self.mesh, &self.backend, &self.camera, &model);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "objview | FPS: {:.1} | Controls: Arrows=Pan Q/A=Depth Esc=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
