use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers,
        MouseEventKind,
    },
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

/// Input events the garden reacts to
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Key(KeyCode, KeyModifiers),
    /// Mouse moved, dragged or clicked at a cell
    Pointer { col: u16, row: u16 },
    Resize(u16, u16),
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        }

        Ok(Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen,
        })
    }

    /// Off-screen buffer of a fixed size, no tty required
    pub fn headless(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: false,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Blank every cell and paint it with `bg`
    pub fn fill(&mut self, bg: Option<Color>) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell {
                    bg,
                    ..Cell::default()
                };
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color, keeping the cell's background
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let cell = &mut self.buffer[y as usize][x as usize];
            cell.ch = ch;
            cell.fg = fg;
            cell.bold = bold;
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Render the entire buffer to screen
    pub fn render(&self) -> io::Result<()> {
        let mut out = stdout().lock();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16), ResetColor, SetAttribute(Attribute::Reset))?;
            let mut fg: Option<Color> = None;
            let mut bg: Option<Color> = None;
            let mut bold = false;

            for cell in row {
                if cell.bg != bg {
                    queue!(out, SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                    bg = cell.bg;
                }
                if cell.fg != fg {
                    queue!(out, SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    fg = cell.fg;
                }
                if cell.bold != bold {
                    let attr = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(out, SetAttribute(attr))?;
                    bold = cell.bold;
                }
                queue!(out, Print(cell.ch))?;
            }
        }

        queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
        out.flush()?;
        Ok(())
    }

    /// Next pending input event (non-blocking)
    pub fn poll_input(&self) -> io::Result<Option<Input>> {
        if !poll(Duration::from_millis(0))? {
            return Ok(None);
        }
        let input = match read()? {
            Event::Key(key_event) => Some(Input::Key(key_event.code, key_event.modifiers)),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                    Some(Input::Pointer {
                        col: mouse.column,
                        row: mouse.row,
                    })
                }
                _ => None,
            },
            Event::Resize(w, h) => Some(Input::Resize(w, h)),
            _ => None,
        };
        Ok(input)
    }

    /// Sleep for specified duration; durations that don't fit a `Duration` are skipped
    pub fn sleep(&self, seconds: f32) {
        if let Ok(delay) = Duration::try_from_secs_f32(seconds.max(0.0)) {
            std::thread::sleep(delay);
        }
    }

    /// Write the buffer as ANSI-colored text
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in &self.buffer {
            for cell in row {
                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }
                if let Some(code) = cell.bg.and_then(|c| sgr(c, true)) {
                    write!(out, "{}", code)?;
                }
                if cell.ch != ' ' {
                    if let Some(code) = cell.fg.and_then(|c| sgr(c, false)) {
                        write!(out, "{}", code)?;
                    }
                }
                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        self.write_ansi(&mut out)?;
        out.flush()
    }
}

#[cfg(test)]
impl Terminal {
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.buffer.get(y).and_then(|row| row.get(x))
    }
}

/// SGR escape selecting `color` as foreground or background
fn sgr(color: Color, background: bool) -> Option<String> {
    let layer = if background { 48 } else { 38 };
    match color {
        Color::Rgb { r, g, b } => Some(format!("\x1b[{};2;{};{};{}m", layer, r, g, b)),
        Color::AnsiValue(v) => Some(format!("\x1b[{};5;{}m", layer, v)),
        Color::Yellow if !background => Some("\x1b[93m".to_string()),
        Color::White if !background => Some("\x1b[97m".to_string()),
        Color::Black if !background => Some("\x1b[30m".to_string()),
        _ => None,
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
