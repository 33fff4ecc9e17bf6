//! Collision detection and response for the rectangular field
//!
//! All checks are axis-aligned and operate on the ball's top-left corner.
//! Paddle tests compare the ball's raw top-edge y against the paddle band, so
//! a ball overlapping only the paddle's lower corner does not count as a hit.

use glam::Vec2;

use super::state::{Ball, Paddle, Side};
use crate::consts::*;
use crate::sign_or_positive;

/// Which horizontal wall the ball is touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Top,
    Bottom,
}

/// Wall the ball is at or beyond, if any
pub fn wall_contact(pos: Vec2) -> Option<Wall> {
    if pos.y <= 0.0 {
        Some(Wall::Top)
    } else if pos.y >= FIELD_HEIGHT - BALL_SIZE {
        Some(Wall::Bottom)
    } else {
        None
    }
}

/// Reflect the vertical velocity off `wall` and pull the ball back onto the field.
///
/// The new velocity always points away from the wall, so a ball that is still
/// past the boundary on the next tick is not flipped back out again.
pub fn bounce_off_wall(ball: &mut Ball, wall: Wall) {
    let speed = ball.vel.y.abs();
    ball.vel.y = match wall {
        Wall::Top => speed,
        Wall::Bottom => -speed,
    };
    ball.pos.y = ball.pos.y.clamp(0.0, FIELD_HEIGHT - BALL_SIZE);
}

/// Whether a ball whose top-left corner is at `pos` touches `paddle`
pub fn paddle_contact(pos: Vec2, paddle: &Paddle) -> bool {
    let leading_x = match paddle.side {
        Side::Left => pos.x,
        Side::Right => pos.x + BALL_SIZE,
    };
    let px = paddle.x();
    let in_band = leading_x >= px && leading_x <= px + PADDLE_WIDTH;
    let in_span = pos.y >= paddle.y && pos.y <= paddle.y + PADDLE_HEIGHT;
    in_band && in_span
}

/// Whether a ball moving with `vel` is heading toward `side`'s paddle
pub fn approaching(vel: Vec2, side: Side) -> bool {
    match side {
        Side::Left => vel.x < 0.0,
        Side::Right => vel.x > 0.0,
    }
}

/// Send the ball away from `side`'s paddle and add `nudge` to its vertical speed
/// in the direction it is already travelling.
pub fn bounce_off_paddle(ball: &mut Ball, side: Side, nudge: f32) {
    let speed = ball.vel.x.abs();
    ball.vel.x = match side {
        Side::Left => speed,
        Side::Right => -speed,
    };
    ball.vel.y += sign_or_positive(ball.vel.y) * nudge;
}

/// Side whose goal line the ball has crossed; the opponent scores
pub fn goal_crossed(pos: Vec2) -> Option<Side> {
    if pos.x < 0.0 {
        Some(Side::Left)
    } else if pos.x > FIELD_WIDTH {
        Some(Side::Right)
    } else {
        None
    }
}
