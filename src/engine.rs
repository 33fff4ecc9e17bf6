//! Match lifecycle
//!
//! `MatchEngine` wraps the pure simulation with the start/pause/reset state
//! machine and writes a `MatchRecord` when a logged-in player's match ends.
//! It never schedules ticks itself: the presentation shell calls `on_tick`
//! once per period and `on_key_down` for each paddle keypress.

use log::info;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::consts::PADDLE_STEP;
use crate::persistence::{CredentialStore, StoreError};
use crate::sim::{GameEvent, MatchPhase, MatchRules, MatchState, Side, tick};

/// Who the engine records results for
#[derive(Clone)]
pub struct MatchContext {
    pub username: String,
    pub store: Rc<CredentialStore>,
}

/// Display names used as the stored winner label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLabels {
    pub left: String,
    pub right: String,
}

impl Default for PlayerLabels {
    fn default() -> Self {
        Self {
            left: "Player 1".to_string(),
            right: "Player 2".to_string(),
        }
    }
}

impl PlayerLabels {
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A single paddle keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddleCommand {
    pub side: Side,
    pub direction: Direction,
}

/// Final result of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub winner: Side,
    pub winner_label: String,
    pub score_left: u32,
    pub score_right: u32,
}

/// What one call to `on_tick` produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Set on the tick that ended the match
    pub outcome: Option<MatchOutcome>,
}

/// One game session's engine
pub struct MatchEngine {
    state: MatchState,
    rules: MatchRules,
    rng: Pcg32,
    labels: PlayerLabels,
    context: Option<MatchContext>,
}

impl MatchEngine {
    /// Engine whose finished matches are saved for `context.username`
    pub fn new(context: MatchContext, rules: MatchRules, labels: PlayerLabels) -> Self {
        Self::build(Some(context), rules, labels)
    }

    /// Engine for a guest match; nothing is persisted
    pub fn guest(rules: MatchRules, labels: PlayerLabels) -> Self {
        Self::build(None, rules, labels)
    }

    fn build(context: Option<MatchContext>, rules: MatchRules, labels: PlayerLabels) -> Self {
        Self {
            state: MatchState::new(),
            rng: rules.rng(),
            rules,
            labels,
            context,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn labels(&self) -> &PlayerLabels {
        &self.labels
    }

    /// Logged-in player, `None` for guest matches
    pub fn username(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.username.as_str())
    }

    /// Start the clock. Returns false if the match was already running or paused.
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            MatchPhase::Running | MatchPhase::Paused => false,
            MatchPhase::Idle | MatchPhase::Ended => {
                if self.state.phase == MatchPhase::Ended {
                    self.state.new_rally();
                }
                self.state.phase = MatchPhase::Running;
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state.phase == MatchPhase::Running {
            self.state.phase = MatchPhase::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.state.phase == MatchPhase::Paused {
            self.state.phase = MatchPhase::Running;
            true
        } else {
            false
        }
    }

    /// Pause if running, resume if paused; otherwise nothing
    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Back to Idle with everything at its initial value
    pub fn reset(&mut self) {
        self.state = MatchState::new();
        self.rng = self.rules.rng();
    }

    /// Advance one tick. On the winning point the result is persisted (for a
    /// logged-in player) and the board is cleared for the next match.
    pub fn on_tick(&mut self) -> Result<TickReport, StoreError> {
        let events = tick(&mut self.state, &self.rules, &mut self.rng);

        let outcome = events.iter().find_map(|event| match *event {
            GameEvent::MatchEnded {
                winner,
                score_left,
                score_right,
            } => Some(MatchOutcome {
                winner,
                winner_label: self.labels.get(winner).to_string(),
                score_left,
                score_right,
            }),
            _ => None,
        });

        if let Some(outcome) = &outcome {
            if let Some(ctx) = &self.context {
                ctx.store.save_match_result(
                    &ctx.username,
                    outcome.score_left,
                    outcome.score_right,
                    &outcome.winner_label,
                )?;
            }
            info!(
                "Match over: {} wins {}-{}",
                outcome.winner_label, outcome.score_left, outcome.score_right
            );
            self.state.new_rally();
        }

        Ok(TickReport { events, outcome })
    }

    /// Move a paddle one step. Ignored unless the match is running.
    pub fn on_key_down(&mut self, command: PaddleCommand) -> bool {
        if self.state.phase != MatchPhase::Running {
            return false;
        }
        let delta = match command.direction {
            Direction::Up => -PADDLE_STEP,
            Direction::Down => PADDLE_STEP,
        };
        self.state.paddle_mut(command.side).shift(delta);
        true
    }
}
