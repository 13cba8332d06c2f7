/// Terminal host for the Sketch3D editor
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use nalgebra::{Point3, Vector3};
use sketch3d_core::{Color, Editor, PointerButton, Scene, ShapeKind, TransformMode};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, trace, warn};

pub mod renderer;

pub use renderer::HalfBlockCanvas;

/// Canvas background, matching the dark editor viewport.
pub const BACKGROUND: Color = Color::rgb(0x1e, 0x1e, 0x1e);

/// Wheel delta reported for one scroll notch.
const WHEEL_NOTCH: f32 = 120.0;
/// Pointer-pixel equivalent of one arrow key press.
const ORBIT_STEP: f32 = 10.0;

/// Shapes bound to the number keys, with their creation parameters.
pub fn palette() -> [(char, ShapeKind); 6] {
    [
        ('1', ShapeKind::point()),
        ('2', ShapeKind::vector(Vector3::new(2.0, 1.0, 1.0))),
        ('3', ShapeKind::cube(2.0)),
        ('4', ShapeKind::sphere(1.5)),
        ('5', ShapeKind::pyramid(2.0, 3.0)),
        ('6', ShapeKind::cone(1.5, 3.0)),
    ]
}

/// Add one of each primitive along the X axis, leaving nothing selected.
pub fn populate_demo(scene: &mut Scene) {
    for (i, (_, kind)) in palette().into_iter().enumerate() {
        let x = (i as f32 - 2.5) * 4.0;
        scene.add(kind, Point3::new(x, 0.0, 0.0));
    }
    scene.select(None);
}

/// Map a terminal cell to the canvas pixel at its lower half.
pub fn cell_to_pixel(column: u16, row: u16) -> (f32, f32) {
    (column as f32, row as f32 * 2.0 + 1.0)
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

/// Main application struct for the terminal editor
pub struct TerminalApp {
    editor: Editor,
    canvas: HalfBlockCanvas,
    scene_path: Option<PathBuf>,
    status: String,
    running: bool,
    dirty: bool,
}

impl TerminalApp {
    pub fn new(editor: Editor) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(editor, cols, rows))
    }

    /// Build an app for a `cols × rows` terminal. The last row holds the
    /// status line.
    pub fn with_size(mut editor: Editor, cols: u16, rows: u16) -> Self {
        let canvas_rows = rows.saturating_sub(1).max(1) as usize;
        editor.resize(cols as f32, canvas_rows as f32 * 2.0);
        Self {
            editor,
            canvas: HalfBlockCanvas::new(cols as usize, canvas_rows, BACKGROUND),
            scene_path: None,
            status: String::from("1-6 add  m/s/r mode  arrows orbit  +/- zoom  Ctrl+S save  q quit"),
            running: true,
            dirty: true,
        }
    }

    /// Where `Ctrl+S` writes the scene document.
    pub fn with_scene_path(mut self, path: PathBuf) -> Self {
        self.scene_path = Some(path);
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        self.dirty = true;
        &mut self.editor
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            if self.dirty {
                self.render()?;
                self.dirty = false;
            }
            if event::poll(Duration::from_millis(50))? {
                let event = event::read()?;
                self.handle_event(event);
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let canvas_rows = rows.saturating_sub(1).max(1) as usize;
        self.canvas.resize(cols as usize, canvas_rows);
        self.editor.resize(cols as f32, canvas_rows as f32 * 2.0);
        self.dirty = true;
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = cell_to_pixel(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(button) => {
                self.editor.pointer_down(pointer_button(button), x, y);
                self.dirty = true;
            }
            MouseEventKind::Up(button) => self.editor.pointer_up(pointer_button(button)),
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                if self.editor.pointer_move(x, y) {
                    self.dirty = true;
                }
            }
            MouseEventKind::ScrollUp => {
                self.editor.wheel(WHEEL_NOTCH);
                self.dirty = true;
            }
            MouseEventKind::ScrollDown => {
                self.editor.wheel(-WHEEL_NOTCH);
                self.dirty = true;
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('s') = key.code {
                self.save();
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char(c @ '1'..='6') => {
                if let Some((_, kind)) = palette().into_iter().find(|(k, _)| *k == c) {
                    self.editor.scene_mut().add(kind, Point3::origin());
                    self.status = format!("added {}", kind.type_tag());
                }
            }
            KeyCode::Char('m') => self.set_mode(TransformMode::Move),
            KeyCode::Char('s') => self.set_mode(TransformMode::Scale),
            KeyCode::Char('r') => self.set_mode(TransformMode::Rotate),
            KeyCode::Delete | KeyCode::Backspace => {
                if let Some(shape) = self.editor.scene_mut().delete_selected() {
                    self.status = format!("deleted {}", shape.kind.type_tag());
                }
            }
            KeyCode::Char('c') => {
                self.editor.scene_mut().clear();
                self.status = String::from("scene cleared");
            }
            KeyCode::Left => self.editor.orbit(-ORBIT_STEP, 0.0),
            KeyCode::Right => self.editor.orbit(ORBIT_STEP, 0.0),
            KeyCode::Up => self.editor.orbit(0.0, -ORBIT_STEP),
            KeyCode::Down => self.editor.orbit(0.0, ORBIT_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.editor.wheel(WHEEL_NOTCH),
            KeyCode::Char('-') => self.editor.wheel(-WHEEL_NOTCH),
            _ => return,
        }
        self.dirty = true;
    }

    fn set_mode(&mut self, mode: TransformMode) {
        let applied = self.editor.scene_mut().set_mode(mode);
        self.status = if applied == mode {
            format!("mode: {}", mode.label())
        } else {
            format!("{} not allowed here, mode: {}", mode.label(), applied.label())
        };
    }

    fn save(&mut self) {
        let Some(path) = &self.scene_path else {
            self.status = String::from("no --scene path given, nothing saved");
            return;
        };
        let document = self.editor.scene().to_document();
        match std::fs::write(path, document) {
            Ok(()) => {
                info!(path = %path.display(), shapes = self.editor.scene().len(), "scene saved");
                self.status = format!("saved {}", path.display());
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "scene save failed");
                self.status = format!("save failed: {err}");
            }
        }
        self.dirty = true;
    }

    fn status_line(&self) -> String {
        let scene = self.editor.scene();
        let selected = scene
            .selected()
            .map_or("none", |shape| shape.kind.type_tag());
        format!(
            " [{}] shapes: {}  selected: {}  | {}",
            scene.mode().label(),
            scene.len(),
            selected,
            self.status
        )
    }

    fn render(&mut self) -> io::Result<()> {
        self.canvas.clear();
        self.editor.render(&mut self.canvas);
        trace!(viewport = ?self.editor.viewport(), "frame rendered");

        let mut stdout = stdout();
        self.canvas.draw(&mut stdout)?;

        // Status line under the canvas
        let (cols, rows) = terminal::size()?;
        let line: String = self.status_line().chars().take(cols as usize).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(TermColor::Yellow),
            Print(line),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
