//! Runs the forest in the terminal, either animated or as a single printed frame

use crate::canvas::BrailleCanvas;
use crate::colors::{HUD_TEXT, SUN};
use crate::config::GardenConfig;
use crate::forest::Forest;
use crate::surface::Surface;
use crate::terminal::{Input, Terminal};
use crossterm::event::{KeyCode, KeyModifiers};
use glam::Vec2;
use std::io;
use std::time::Instant;
use tracing::{debug, info};

// Longest simulated step; a stalled terminal shouldn't make trees jump
const MAX_DT: f32 = 0.25;

/// Interactive controls
struct GardenState {
    delay: f32, // seconds slept between frames
    paused: bool,
    hud: bool,
    pointer: Option<Vec2>,
    replant: bool,
}

impl GardenState {
    fn new(delay: f32, hud: bool) -> Self {
        Self {
            delay,
            paused: false,
            hud,
            pointer: None,
            replant: false,
        }
    }

    /// Handle keypress, returns true if should quit
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('r') => self.replant = true,
            KeyCode::Char('m') => self.pointer = None,
            KeyCode::Char('i') => self.hud = !self.hud,
            // 1=fastest, 9=slowest, 0=very slow
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.delay = match c {
                    '0' => 0.2,
                    '1' => 0.005,
                    '2' => 0.01,
                    '3' => 0.02,
                    '4' => 0.03,
                    '5' => 0.05,
                    '6' => 0.07,
                    '7' => 0.1,
                    '8' => 0.15,
                    _ => 0.18,
                };
            }
            _ => {}
        }
        false
    }

    fn point_at(&mut self, col: u16, row: u16) {
        self.pointer = Some(cell_center(col, row));
    }
}

/// Dot coordinates of the middle of a terminal cell
fn cell_center(col: u16, row: u16) -> Vec2 {
    Vec2::new(col as f32 * 2.0 + 1.0, row as f32 * 4.0 + 2.0)
}

/// Terminal cell holding a dot position
fn dot_cell(p: Vec2) -> (i32, i32) {
    ((p.x / 2.0).floor() as i32, (p.y / 4.0).floor() as i32)
}

pub fn run(mut config: GardenConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    config.forest.seed = seed;
    info!(seed, variant = config.forest.variant.name(), "planting garden");

    if config.print {
        run_print_mode(&config)
    } else {
        run_interactive(&config)
    }
}

/// Simulate `frames` fixed steps off-screen and print the last one
fn run_print_mode(config: &GardenConfig) -> io::Result<()> {
    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let cols = config.width.unwrap_or(cols).max(1);
    let rows = config.height.unwrap_or(rows).max(1);

    let term = render_frames(config, cols, rows);
    term.print_to_stdout()
}

fn render_frames(config: &GardenConfig, cols: u16, rows: u16) -> Terminal {
    let mut canvas = BrailleCanvas::new(cols, rows);
    let mut forest = Forest::new(config.forest.clone(), canvas.size());

    for _ in 0..config.frames {
        forest.frame(config.time_step, None, &mut canvas);
    }
    debug!(
        frames = forest.frames(),
        branches = forest.branch_count(),
        "printing frame"
    );

    let mut term = Terminal::headless(cols, rows);
    draw(&canvas, &forest, config.hud, &mut term);
    term
}

fn run_interactive(config: &GardenConfig) -> io::Result<()> {
    let mut term = Terminal::new(true)?;
    term.clear_screen()?;

    let (cols, rows) = term.size();
    let mut canvas = BrailleCanvas::new(cols, rows);
    let mut forest = Forest::new(config.forest.clone(), canvas.size());
    let mut state = GardenState::new(config.time_step, config.hud);
    let mut last = Instant::now();

    loop {
        while let Some(input) = term.poll_input()? {
            match input {
                Input::Key(code, modifiers) => {
                    if state.handle_key(code, modifiers) {
                        info!(
                            frames = forest.frames(),
                            branches = forest.branch_count(),
                            "leaving garden"
                        );
                        return Ok(());
                    }
                }
                Input::Pointer { col, row } => state.point_at(col, row),
                Input::Resize(w, h) => {
                    term.resize(w, h);
                    canvas.resize(w, h);
                    forest.reset(canvas.size());
                    state.pointer = None;
                    debug!(cols = w, rows = h, "terminal resized");
                }
            }
        }

        if state.replant {
            state.replant = false;
            forest.reset(canvas.size());
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;

        if !state.paused {
            forest.frame(dt, state.pointer, &mut canvas);
        }

        draw(&canvas, &forest, state.hud, &mut term);
        term.render()?;
        term.sleep(state.delay);
    }
}

/// Compose canvas, sun and HUD into the terminal buffer
fn draw(canvas: &BrailleCanvas, forest: &Forest, hud: bool, term: &mut Terminal) {
    canvas.blit(term);

    let (x, y) = dot_cell(forest.sun());
    term.set(x, y, '☀', Some(SUN.to_color()), true);

    if hud {
        let season = forest.season();
        let line = format!(
            " {} {:>3}% | trees {} | branches {} | {} ",
            season.season().name(),
            (season.t() * 100.0) as u32,
            forest.trees().len(),
            forest.branch_count(),
            forest.config().variant.name(),
        );
        term.set_str(0, 0, &line, Some(HUD_TEXT.to_color()), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ForestConfig, Variant};

    fn garden(frames: u32, hud: bool) -> GardenConfig {
        GardenConfig {
            print: true,
            time_step: 1.0 / 30.0,
            frames,
            width: Some(40),
            height: Some(12),
            hud,
            seed: Some(7),
            forest: ForestConfig::new(Variant::Sprout, 7),
        }
    }

    fn glyphs(term: &Terminal) -> String {
        let (w, h) = term.size();
        (0..h as usize)
            .flat_map(|y| (0..w as usize).map(move |x| (x, y)))
            .filter_map(|(x, y)| term.cell(x, y).map(|c| c.ch))
            .collect()
    }

    #[test]
    fn test_digits_change_delay() {
        let mut state = GardenState::new(0.03, false);
        state.handle_key(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(state.delay, 0.005);
        state.handle_key(KeyCode::Char('0'), KeyModifiers::NONE);
        assert_eq!(state.delay, 0.2);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = GardenState::new(0.03, false);
        assert!(state.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(state.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(state.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!state.handle_key(KeyCode::Char('c'), KeyModifiers::NONE));
    }

    #[test]
    fn test_toggles_and_pointer() {
        let mut state = GardenState::new(0.03, false);
        state.handle_key(KeyCode::Char(' '), KeyModifiers::NONE);
        state.handle_key(KeyCode::Char('i'), KeyModifiers::NONE);
        state.handle_key(KeyCode::Char('r'), KeyModifiers::NONE);
        assert!(state.paused && state.hud && state.replant);

        state.point_at(3, 2);
        assert_eq!(state.pointer, Some(Vec2::new(7.0, 10.0)));
        state.handle_key(KeyCode::Char('m'), KeyModifiers::NONE);
        assert_eq!(state.pointer, None);
    }

    #[test]
    fn test_dot_cell_inverts_cell_center() {
        assert_eq!(dot_cell(cell_center(5, 9)), (5, 9));
        assert_eq!(dot_cell(Vec2::new(-0.5, 3.9)), (-1, 0));
    }

    #[test]
    fn test_render_frames_draws_trees_and_sun() {
        let term = render_frames(&garden(60, false), 40, 12);
        let text = glyphs(&term);
        assert!(text.contains('☀'));
        assert!(text.chars().any(|c| ('\u{2801}'..='\u{28ff}').contains(&c)));
    }

    #[test]
    fn test_render_frames_is_deterministic() {
        let a = glyphs(&render_frames(&garden(45, false), 40, 12));
        let b = glyphs(&render_frames(&garden(45, false), 40, 12));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hud_shows_season_and_variant() {
        let text = glyphs(&render_frames(&garden(10, true), 60, 12));
        assert!(text.contains("spring"));
        assert!(text.contains("sprout"));
    }
}
