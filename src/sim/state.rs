//! Match state and core simulation types
//!
//! Everything the per-tick update reads or writes lives here. None of it is
//! persisted; a finished match survives only as a `MatchRecord`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::field_center;

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Fresh engine, nothing played yet
    #[default]
    Idle,
    /// Ticks advance the ball
    Running,
    /// Clock stopped mid-match
    Paused,
    /// A player reached the winning score; ready for a new match
    Ended,
}

/// Which player / paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Player 1, left paddle
    Left,
    /// Player 2, right paddle
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// How paddle hits and serves change the ball's velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BounceMode {
    /// Paddle hits add exactly one unit of vertical speed; serves are fixed
    #[default]
    Steady,
    /// Paddle hits add a random nudge in [-1, 1]; serves pick a random angle
    Jitter { seed: u64 },
}

/// Rules a match is played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRules {
    pub winning_score: u32,
    pub bounce: BounceMode,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            winning_score: WINNING_SCORE,
            bounce: BounceMode::Steady,
        }
    }
}

impl MatchRules {
    /// Fresh RNG for jitter mode (unused under `Steady`)
    pub fn rng(&self) -> Pcg32 {
        let seed = match self.bounce {
            BounceMode::Jitter { seed } => seed,
            BounceMode::Steady => 0,
        };
        Pcg32::seed_from_u64(seed)
    }
}

/// The ball. `pos` is its top-left corner; it occupies a BALL_SIZE square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: field_center(BALL_SIZE),
            vel: Vec2::new(BALL_SPEED, BALL_SPEED),
        }
    }
}

impl Ball {
    /// Recenter and serve toward the opposite direction of travel.
    ///
    /// Vertical speed is reset to BALL_SPEED keeping its sign.
    pub fn recenter(&mut self) {
        self.pos = field_center(BALL_SIZE);
        self.vel = Vec2::new(
            -self.vel.x,
            BALL_SPEED * crate::sign_or_positive(self.vel.y),
        );
    }
}

/// One player's paddle. Only the vertical position moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    /// Top edge
    pub y: f32,
}

impl Paddle {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            y: (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0,
        }
    }

    /// Left edge of the paddle
    pub fn x(&self) -> f32 {
        match self.side {
            Side::Left => LEFT_PADDLE_X,
            Side::Right => RIGHT_PADDLE_X,
        }
    }

    /// Move by `delta`, clamped so the paddle stays on the field
    pub fn shift(&mut self, delta: f32) {
        self.y = (self.y + delta).clamp(0.0, FIELD_HEIGHT - PADDLE_HEIGHT);
    }
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub ball: Ball,
    pub left: Paddle,
    pub right: Paddle,
    pub score_left: u32,
    pub score_right: u32,
    pub phase: MatchPhase,
    /// Ticks advanced in the current match
    pub time_ticks: u64,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            ball: Ball::default(),
            left: Paddle::new(Side::Left),
            right: Paddle::new(Side::Right),
            score_left: 0,
            score_right: 0,
            phase: MatchPhase::Idle,
            time_ticks: 0,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.score_left,
            Side::Right => self.score_right,
        }
    }

    pub fn award_point(&mut self, side: Side) {
        match side {
            Side::Left => self.score_left += 1,
            Side::Right => self.score_right += 1,
        }
    }

    /// Side that has reached `winning_score`, if any
    pub fn winner(&self, winning_score: u32) -> Option<Side> {
        if self.score_left >= winning_score {
            Some(Side::Left)
        } else if self.score_right >= winning_score {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Zero the scores and recenter the ball; paddles stay where they are
    pub fn new_rally(&mut self) {
        self.score_left = 0;
        self.score_right = 0;
        self.ball = Ball::default();
        self.time_ticks = 0;
    }
}
