//! Crossterm presentation shell
//!
//! Draws the field as a character grid scaled to the terminal size and
//! reads keys in raw mode.

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;

use super::{KeySource, MessageKind, Presenter, ShellKey};
use crate::consts::{BALL_SIZE, FIELD_HEIGHT, FIELD_WIDTH, PADDLE_HEIGHT, PADDLE_WIDTH};
use crate::engine::PlayerLabels;
use crate::settings::KeyBindings;
use crate::sim::{MatchPhase, MatchState, Side};

const HEADER_LINES: usize = 2;
const FOOTER_LINES: usize = 2;
const MIN_GRID: (usize, usize) = (24, 8);

/// Full-screen shell. Raw mode and the alternate screen are restored on drop.
pub struct TerminalShell {
    stdout: Stdout,
    labels: PlayerLabels,
    keys: KeyBindings,
    dirty: bool,
}

impl TerminalShell {
    pub fn enter(labels: PlayerLabels, keys: KeyBindings) -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(Self {
            stdout,
            labels,
            keys,
            dirty: false,
        })
    }

    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        let output = format!("{}\r\n", lines.join("\r\n"));
        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        self.stdout.write_all(output.as_bytes())?;
        self.stdout.flush()
    }
}

impl Drop for TerminalShell {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Presenter for TerminalShell {
    fn render(&mut self, state: &MatchState) -> io::Result<()> {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let lines = frame_lines(state, &self.labels, &self.keys, cols as usize, rows as usize);
        self.write_lines(&lines)?;
        self.dirty = false;
        Ok(())
    }

    fn show_message(&mut self, kind: MessageKind, text: &str) -> io::Result<()> {
        let mut lines = vec![String::new()];
        lines.extend(message_box(kind, text));
        lines.push(String::new());
        lines.push("  Press ENTER to continue".to_string());
        self.write_lines(&lines)?;

        // Drop keys typed during the match so they do not dismiss the box
        while event::poll(Duration::ZERO)? {
            let _ = event::read()?;
        }
        loop {
            let key = self.next_key(Duration::from_millis(50))?;
            if matches!(key, Some(ShellKey::Enter | ShellKey::Escape)) {
                break;
            }
        }
        self.dirty = true;
        Ok(())
    }

    fn request_redraw(&mut self) {
        self.dirty = true;
    }

    fn redraw_pending(&self) -> bool {
        self.dirty
    }
}

impl KeySource for TerminalShell {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<ShellKey>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(map_key(key)),
            Event::Resize(..) => {
                self.dirty = true;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

fn map_key(key: KeyEvent) -> Option<ShellKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(ShellKey::Escape),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ShellKey::Escape)
        }
        KeyCode::Char(' ') => Some(ShellKey::Space),
        KeyCode::Enter => Some(ShellKey::Enter),
        KeyCode::Char(c) => Some(ShellKey::Char(c)),
        _ => None,
    }
}

/// Grid size for a terminal of `cols` x `rows`
fn grid_size(cols: usize, rows: usize) -> (usize, usize) {
    let width = cols.saturating_sub(2).max(MIN_GRID.0);
    let height = rows
        .saturating_sub(HEADER_LINES + FOOTER_LINES + 2)
        .max(MIN_GRID.1);
    (width, height)
}

/// Map a field coordinate onto a grid of `cells` cells spanning `extent` units
fn to_cell(v: f32, extent: f32, cells: usize) -> usize {
    let cell = (v / extent * cells as f32).floor();
    (cell.max(0.0) as usize).min(cells - 1)
}

/// One complete frame: header, bordered field, footer
fn frame_lines(
    state: &MatchState,
    labels: &PlayerLabels,
    keys: &KeyBindings,
    cols: usize,
    rows: usize,
) -> Vec<String> {
    let (width, height) = grid_size(cols, rows);
    let mut grid = vec![vec![' '; width]; height];

    let mid = width / 2;
    for (row, line) in grid.iter_mut().enumerate() {
        if row % 2 == 0 {
            line[mid] = ':';
        }
    }

    for side in [Side::Left, Side::Right] {
        let paddle = state.paddle(side);
        let col = to_cell(paddle.x() + PADDLE_WIDTH / 2.0, FIELD_WIDTH, width);
        let top = to_cell(paddle.y, FIELD_HEIGHT, height);
        let bottom = to_cell(paddle.y + PADDLE_HEIGHT - 0.01, FIELD_HEIGHT, height);
        for line in &mut grid[top..=bottom] {
            line[col] = '#';
        }
    }

    let center = state.ball.pos + BALL_SIZE / 2.0;
    if (0.0..FIELD_WIDTH).contains(&center.x) {
        let col = to_cell(center.x, FIELD_WIDTH, width);
        let row = to_cell(center.y, FIELD_HEIGHT, height);
        grid[row][col] = 'O';
    }

    let mut lines = Vec::with_capacity(height + HEADER_LINES + FOOTER_LINES + 2);
    lines.push(format!(
        "{} {}  :  {} {}",
        labels.left, state.score_left, state.score_right, labels.right
    ));
    lines.push(status_line(state.phase).to_string());
    lines.push(format!("+{}+", "-".repeat(width)));
    for line in grid {
        lines.push(format!("|{}|", line.into_iter().collect::<String>()));
    }
    lines.push(format!("+{}+", "-".repeat(width)));
    lines.push(format!(
        "{}: {}/{}   {}: {}/{}   SPACE start/resume  P pause  R reset  ESC leave",
        labels.left, keys.p1_up, keys.p1_down, labels.right, keys.p2_up, keys.p2_down
    ));
    lines
}

fn status_line(phase: MatchPhase) -> &'static str {
    match phase {
        MatchPhase::Idle => "Press SPACE to start",
        MatchPhase::Running => "",
        MatchPhase::Paused => "Paused - press SPACE or P to resume",
        MatchPhase::Ended => "Match over - press SPACE for a new match",
    }
}

pub(super) fn message_box(kind: MessageKind, text: &str) -> Vec<String> {
    let title = match kind {
        MessageKind::Info => "Info",
        MessageKind::Warning => "Warning",
        MessageKind::Error => "Error",
    };
    let inner = text.chars().count().max(title.len()) + 2;
    vec![
        format!("  +{}+", "-".repeat(inner)),
        format!("  | {:<w$} |", title, w = inner - 2),
        format!("  |{}|", " ".repeat(inner)),
        format!("  | {:<w$} |", text, w = inner - 2),
        format!("  +{}+", "-".repeat(inner)),
    ]
}
