//! Platform abstraction layer
//!
//! The core never owns a window or a clock. A presentation shell:
//! - Renders `MatchState` frames
//! - Shows modal messages
//! - Delivers keys and drives the fixed-period tick via `run_match`

use std::io;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::auth::AuthError;
use crate::engine::MatchEngine;
use crate::persistence::StoreError;
use crate::settings::KeyBindings;
use crate::sim::{MatchPhase, MatchState};

pub mod prompt;
pub mod terminal;

pub use terminal::TerminalShell;

/// Severity of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
}

/// Keys the shell reports to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKey {
    Char(char),
    Space,
    Enter,
    Escape,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the core needs from a presentation shell
pub trait Presenter {
    /// Draw the current frame
    fn render(&mut self, state: &MatchState) -> io::Result<()>;

    /// Modal dialog; returns once the player acknowledges it
    fn show_message(&mut self, kind: MessageKind, text: &str) -> io::Result<()>;

    /// Ask for a frame outside the tick cadence
    fn request_redraw(&mut self);

    /// A redraw was requested since the last `render`
    fn redraw_pending(&self) -> bool;
}

/// Source of key presses
pub trait KeySource {
    /// Wait up to `timeout` for a key
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<ShellKey>>;
}

/// Run one game session until the player presses Escape.
///
/// Space starts or resumes, `p` toggles pause, `r` resets; paddle keys come from
/// `keys`. The engine is ticked every `period` while running, and each
/// finished match is announced with a modal message.
pub fn run_match<S>(
    engine: &mut MatchEngine,
    shell: &mut S,
    keys: &KeyBindings,
    period: Duration,
) -> Result<(), ShellError>
where
    S: Presenter + KeySource,
{
    shell.render(engine.state())?;
    let mut next_tick = Instant::now() + period;

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        if let Some(key) = shell.next_key(wait)? {
            match key {
                ShellKey::Escape => break,
                ShellKey::Space => {
                    if engine.start() || engine.resume() {
                        next_tick = Instant::now() + period;
                        shell.request_redraw();
                    }
                }
                ShellKey::Char(c) => {
                    if let Some(command) = keys.command_for(c) {
                        if engine.on_key_down(command) {
                            shell.request_redraw();
                        }
                    } else {
                        let changed = match c.to_ascii_lowercase() {
                            'p' => engine.toggle_pause(),
                            'r' => {
                                engine.reset();
                                true
                            }
                            _ => false,
                        };
                        if changed {
                            shell.request_redraw();
                        }
                    }
                }
                ShellKey::Enter => {}
            }
        }

        let now = Instant::now();
        if now >= next_tick {
            next_tick += period;
            // Do not try to catch up after a long stall
            if next_tick < now {
                next_tick = now + period;
            }

            if engine.phase() == MatchPhase::Running {
                let report = engine.on_tick()?;
                shell.render(engine.state())?;
                if let Some(outcome) = report.outcome {
                    let text = format!(
                        "{} wins {}-{}!",
                        outcome.winner_label, outcome.score_left, outcome.score_right
                    );
                    shell.show_message(MessageKind::Info, &text)?;
                    shell.request_redraw();
                }
            }
        }

        if shell.redraw_pending() {
            shell.render(engine.state())?;
        }
    }

    Ok(())
}

/// Show a recoverable auth failure as a modal dialog.
///
/// Returns whether the operation succeeded. Storage failures are not shown;
/// they come back as errors and end the session.
pub fn report_auth<P>(presenter: &mut P, result: Result<(), AuthError>) -> Result<bool, ShellError>
where
    P: Presenter + ?Sized,
{
    match result {
        Ok(()) => Ok(true),
        Err(AuthError::Storage(e)) => Err(e.into()),
        Err(err) => {
            let kind = match &err {
                AuthError::Validation(_) => MessageKind::Warning,
                _ => MessageKind::Error,
            };
            presenter.show_message(kind, &err.to_string())?;
            Ok(false)
        }
    }
}
