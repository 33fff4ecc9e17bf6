//! Pong Club - two-player Pong with local accounts and match history
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball/paddle physics, scoring)
//! - `engine`: Match lifecycle driven by an external clock
//! - `persistence`: SQLite-backed accounts and match history
//! - `auth`: Registration, login and the logged-in session
//! - `history`: Read-only match history for a user
//! - `platform`: Presentation shell contract and the terminal shell
//! - `settings`: User configuration

pub mod auth;
pub mod engine;
pub mod history;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use auth::{AuthError, Session, ValidationError};
pub use engine::{MatchContext, MatchEngine, TickReport};
pub use history::{HistoryReporter, MatchSummary};
pub use persistence::{CredentialStore, MatchRecord, StoreError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed tick period in milliseconds (~60 Hz)
    pub const TICK_MS: u64 = 16;

    /// Playing field dimensions (logical units)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Paddle geometry
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 80.0;
    /// Gap between a paddle and its side wall
    pub const PADDLE_MARGIN: f32 = 20.0;
    /// Distance a paddle moves per keypress
    pub const PADDLE_STEP: f32 = 20.0;

    /// Ball diameter
    pub const BALL_SIZE: f32 = 15.0;
    /// Serve speed on both axes
    pub const BALL_SPEED: f32 = 5.0;
    /// Vertical speed added on each paddle hit
    pub const PADDLE_NUDGE: f32 = 1.0;

    /// First player to reach this score wins
    pub const WINNING_SCORE: u32 = 5;

    /// Minimum password length accepted at registration
    pub const MIN_PASSWORD_LEN: usize = 4;

    /// Left paddle x (its left edge)
    pub const LEFT_PADDLE_X: f32 = PADDLE_MARGIN;
    /// Right paddle x (its left edge)
    pub const RIGHT_PADDLE_X: f32 = FIELD_WIDTH - PADDLE_MARGIN - PADDLE_WIDTH;
}

/// Top-left corner that centers a square of `size` in the field
#[inline]
pub fn field_center(size: f32) -> glam::Vec2 {
    use consts::*;
    glam::Vec2::new((FIELD_WIDTH - size) / 2.0, (FIELD_HEIGHT - size) / 2.0)
}

/// Unit sign that treats zero as positive
#[inline]
pub fn sign_or_positive(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consts::*;

    #[test]
    fn test_right_paddle_mirrors_left() {
        assert_eq!(LEFT_PADDLE_X, 20.0);
        assert_eq!(RIGHT_PADDLE_X, 770.0);
        assert_eq!(FIELD_WIDTH - (RIGHT_PADDLE_X + PADDLE_WIDTH), LEFT_PADDLE_X);
    }

    #[test]
    fn test_field_center() {
        let c = field_center(BALL_SIZE);
        assert_eq!(c.x, 392.5);
        assert_eq!(c.y, 242.5);
    }

    #[test]
    fn test_sign_or_positive() {
        assert_eq!(sign_or_positive(-3.0), -1.0);
        assert_eq!(sign_or_positive(0.0), 1.0);
        assert_eq!(sign_or_positive(2.5), 1.0);
    }
}
