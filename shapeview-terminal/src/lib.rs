/// Terminal front end for the shapeview engine.
///
/// Mouse drags spin the shown surface, clicks on the bottom strip swap it,
/// and an ASCII rasterizer draws every frame into the alternate screen.
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use shapeview_core::{ApplicationEngine, Error, IVec2, RenderingEngine, ResourceManager, Result};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod config;
pub mod renderer;

pub use config::{DisplayConfig, TerminalConfig};
pub use renderer::AsciiRenderer;

/// Main application struct for terminal 3D rendering.
///
/// Owns the engine and the renderer; the engine only borrows the renderer
/// while drawing a frame.
pub struct TerminalApp {
    engine: ApplicationEngine,
    renderer: AsciiRenderer,
    display: DisplayConfig,
    finger: Option<IVec2>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build the app for the current terminal size
    pub fn new(config: TerminalConfig, resources: &dyn ResourceManager) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, resources, width, height)
    }

    /// Build the app for a `width` x `height` cell grid without touching the
    /// terminal
    pub fn with_size(
        config: TerminalConfig,
        resources: &dyn ResourceManager,
        width: u16,
        height: u16,
    ) -> Result<Self> {
        check_size(&config, width, height)?;

        let surfaces = config.engine.build_surfaces(resources)?;
        let mut renderer = AsciiRenderer::new(
            width as usize,
            height as usize,
            config.display.cell_aspect,
            config.display.projection,
        );
        renderer.set_wireframe(config.display.wireframe);
        renderer.initialize(&surfaces)?;

        let engine = ApplicationEngine::new(config.engine, width as i32, height as i32);
        info!(width, height, "terminal app ready");

        Ok(Self {
            engine,
            renderer,
            display: config.display,
            finger: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn engine(&self) -> &ApplicationEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_secs(1) / self.display.fps;
        let mut previous_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update
            self.engine.update_animation((frame_start - previous_tick).as_secs_f32());
            previous_tick = frame_start;

            // Render
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

    /// Feed one terminal event into the engine
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind != KeyEventKind::Press {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') => {
                let wireframe = !self.renderer.wireframe();
                self.renderer.set_wireframe(wireframe);
                debug!(wireframe, "toggled wireframe");
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let button = digit as usize - '1' as usize;
                if button < self.engine.layout().button_count() {
                    let center = self.engine.layout().button_center(button);
                    self.engine.on_finger_down(center);
                    self.engine.on_finger_up(center);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let location = IVec2::new(column as i32, row as i32);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.engine.on_finger_down(location);
                self.finger = Some(location);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(previous) = self.finger.replace(location) {
                    self.engine.on_finger_move(previous, location);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.finger.take().is_some() {
                    self.engine.on_finger_up(location);
                }
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        if let Err(e) = check_size_for(self.engine.layout().button_count(), width, height) {
            debug!(width, height, "ignoring resize: {e}");
            return;
        }
        self.engine.initialize(width as i32, height as i32);
        self.renderer.resize(width as usize, height as usize);
    }

    fn render(&mut self) -> Result<()> {
        self.engine.render(&mut self.renderer);

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "shapeview | FPS: {:.1} | Drag=Spin Click/1-9=Swap W=Wireframe Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn check_size(config: &TerminalConfig, width: u16, height: u16) -> Result<()> {
    config.engine.validate()?;
    config.display.validate()?;
    check_size_for(config.engine.button_count(), width, height)
}

fn check_size_for(button_count: usize, width: u16, height: u16) -> Result<()> {
    if (width as usize) < button_count.max(1) || height < 2 {
        return Err(Error::InvalidConfig(format!(
            "terminal of {width}x{height} cells is too small for {button_count} buttons"
        )));
    }
    Ok(())
}
