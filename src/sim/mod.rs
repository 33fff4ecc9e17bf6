//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, driven by the caller
//! - Seeded RNG only
//! - No storage, rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Wall, approaching, bounce_off_paddle, bounce_off_wall, goal_crossed, paddle_contact, wall_contact};
pub use state::{Ball, BounceMode, MatchPhase, MatchRules, MatchState, Paddle, Side};
pub use tick::{GameEvent, tick};
