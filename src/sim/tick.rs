//! Fixed timestep simulation tick
//!
//! Advances the match by one step. The caller owns the clock; nothing here
//! knows about wall time.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{approaching, bounce_off_paddle, bounce_off_wall, goal_crossed, paddle_contact, wall_contact};
use super::state::{BounceMode, MatchPhase, MatchRules, MatchState, Side};
use crate::consts::*;

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    WallBounce,
    PaddleHit(Side),
    /// `Side` scored a point
    Scored(Side),
    /// `winner` reached the winning score; scores are the final tally
    MatchEnded {
        winner: Side,
        score_left: u32,
        score_right: u32,
    },
}

/// Advance the match by one tick. Does nothing unless the match is running.
pub fn tick(state: &mut MatchState, rules: &MatchRules, rng: &mut Pcg32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != MatchPhase::Running {
        return events;
    }

    state.time_ticks += 1;

    // Paddle tests use where the ball stood, and where it was heading,
    // before this tick's move
    let start = state.ball.pos;
    let heading = state.ball.vel;
    state.ball.pos += state.ball.vel;

    if let Some(wall) = wall_contact(state.ball.pos) {
        bounce_off_wall(&mut state.ball, wall);
        events.push(GameEvent::WallBounce);
    }

    for side in [Side::Left, Side::Right] {
        if approaching(heading, side) && paddle_contact(start, state.paddle(side)) {
            let nudge = match rules.bounce {
                BounceMode::Steady => PADDLE_NUDGE,
                BounceMode::Jitter { .. } => rng.random_range(-PADDLE_NUDGE..=PADDLE_NUDGE),
            };
            bounce_off_paddle(&mut state.ball, side, nudge);
            events.push(GameEvent::PaddleHit(side));
        }
    }

    if let Some(missed) = goal_crossed(state.ball.pos) {
        let scorer = missed.opponent();
        state.award_point(scorer);
        serve(state, rules, rng);
        events.push(GameEvent::Scored(scorer));

        if let Some(winner) = state.winner(rules.winning_score) {
            state.phase = MatchPhase::Ended;
            events.push(GameEvent::MatchEnded {
                winner,
                score_left: state.score_left,
                score_right: state.score_right,
            });
        }
    }

    events
}

/// Put the ball back in the middle after a point
fn serve(state: &mut MatchState, rules: &MatchRules, rng: &mut Pcg32) {
    state.ball.recenter();
    if let BounceMode::Jitter { .. } = rules.bounce {
        let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        state.ball.vel = Vec2::new(dir * BALL_SPEED, rng.random_range(-3.0..=3.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Ball;
    use proptest::prelude::*;

    fn running() -> MatchState {
        let mut state = MatchState::new();
        state.phase = MatchPhase::Running;
        state
    }

    fn steady() -> (MatchRules, Pcg32) {
        let rules = MatchRules::default();
        let rng = rules.rng();
        (rules, rng)
    }

    #[test]
    fn test_tick_ignored_unless_running() {
        let (rules, mut rng) = steady();
        for phase in [MatchPhase::Idle, MatchPhase::Paused, MatchPhase::Ended] {
            let mut state = MatchState::new();
            state.phase = phase;
            let before = state.ball;
            assert!(tick(&mut state, &rules, &mut rng).is_empty());
            assert_eq!(state.ball, before);
            assert_eq!(state.time_ticks, 0);
        }
    }

    #[test]
    fn test_ball_advances_by_velocity() {
        let (rules, mut rng) = steady();
        let mut state = running();
        tick(&mut state, &rules, &mut rng);
        assert_eq!(state.ball.pos, Vec2::new(397.5, 247.5));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_left_paddle_scenario() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.left.y = 210.0;
        state.ball = Ball {
            pos: Vec2::new(21.0, 250.0),
            vel: Vec2::new(-5.0, 5.0),
        };

        let events = tick(&mut state, &rules, &mut rng);
        assert!(events.contains(&GameEvent::PaddleHit(Side::Left)));
        assert_eq!(state.ball.vel.x, 5.0);
        assert_eq!(state.ball.vel.y, 6.0);
    }

    #[test]
    fn test_one_contact_nudges_once() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.left.y = 210.0;
        state.ball = Ball {
            pos: Vec2::new(21.0, 230.0),
            vel: Vec2::new(-5.0, 5.0),
        };

        let mut hits = 0;
        for _ in 0..8 {
            hits += tick(&mut state, &rules, &mut rng)
                .iter()
                .filter(|e| **e == GameEvent::PaddleHit(Side::Left))
                .count();
        }
        // The ball re-enters the paddle band on its way out; that is not a hit
        assert_eq!(hits, 1);
        assert_eq!(state.ball.vel, Vec2::new(5.0, 6.0));
        assert!(state.ball.pos.x > 30.0);
    }

    #[test]
    fn test_receding_ball_passes_paddle() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.right.y = 100.0;
        state.ball = Ball {
            pos: Vec2::new(760.0, 120.0),
            vel: Vec2::new(-5.0, 5.0),
        };
        assert!(tick(&mut state, &rules, &mut rng).is_empty());
        assert_eq!(state.ball.vel, Vec2::new(-5.0, 5.0));
    }

    #[test]
    fn test_right_paddle_hit() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.right.y = 100.0;
        state.ball = Ball {
            pos: Vec2::new(760.0, 120.0),
            vel: Vec2::new(5.0, -5.0),
        };

        let events = tick(&mut state, &rules, &mut rng);
        assert_eq!(events, vec![GameEvent::PaddleHit(Side::Right)]);
        assert_eq!(state.ball.vel, Vec2::new(-5.0, -6.0));
    }

    #[test]
    fn test_wall_bounce_reflects_and_reenters() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.ball = Ball {
            pos: Vec2::new(400.0, 2.0),
            vel: Vec2::new(5.0, -5.0),
        };

        let events = tick(&mut state, &rules, &mut rng);
        assert_eq!(events, vec![GameEvent::WallBounce]);
        assert_eq!(state.ball.vel.y, 5.0);

        tick(&mut state, &rules, &mut rng);
        assert!(state.ball.pos.y > 0.0);
        assert!(state.ball.pos.y < FIELD_HEIGHT - BALL_SIZE);
    }

    #[test]
    fn test_bottom_wall_bounce() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.ball = Ball {
            pos: Vec2::new(400.0, 483.0),
            vel: Vec2::new(-5.0, 5.0),
        };
        tick(&mut state, &rules, &mut rng);
        assert_eq!(state.ball.vel.y, -5.0);
        assert_eq!(state.ball.pos.y, FIELD_HEIGHT - BALL_SIZE);
    }

    #[test]
    fn test_miss_on_left_scores_for_right() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.left.y = 0.0;
        state.ball = Ball {
            pos: Vec2::new(3.0, 400.0),
            vel: Vec2::new(-5.0, -7.0),
        };

        let events = tick(&mut state, &rules, &mut rng);
        assert_eq!(events, vec![GameEvent::Scored(Side::Right)]);
        assert_eq!(state.score_right, 1);
        assert_eq!(state.ball.pos, Vec2::new(392.5, 242.5));
        assert_eq!(state.ball.vel, Vec2::new(5.0, -5.0));
    }

    #[test]
    fn test_miss_on_right_scores_for_left() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.right.y = 0.0;
        state.ball = Ball {
            pos: Vec2::new(798.0, 400.0),
            vel: Vec2::new(5.0, 6.0),
        };

        tick(&mut state, &rules, &mut rng);
        assert_eq!(state.score_left, 1);
        assert_eq!(state.ball.vel, Vec2::new(-5.0, 5.0));
    }

    #[test]
    fn test_fifth_point_ends_match() {
        let (rules, mut rng) = steady();
        let mut state = running();
        state.score_left = 4;
        state.score_right = 2;
        state.right.y = 0.0;
        state.ball = Ball {
            pos: Vec2::new(798.0, 400.0),
            vel: Vec2::new(5.0, 5.0),
        };

        let events = tick(&mut state, &rules, &mut rng);
        assert_eq!(
            events.last(),
            Some(&GameEvent::MatchEnded {
                winner: Side::Left,
                score_left: 5,
                score_right: 2,
            })
        );
        assert_eq!(state.phase, MatchPhase::Ended);
    }

    #[test]
    fn test_jitter_is_deterministic_per_seed() {
        let rules = MatchRules {
            bounce: BounceMode::Jitter { seed: 42 },
            ..Default::default()
        };
        let run = || {
            let mut rng = rules.rng();
            let mut state = running();
            state.left.y = 0.0;
            state.ball = Ball {
                pos: Vec2::new(3.0, 400.0),
                vel: Vec2::new(-5.0, 5.0),
            };
            tick(&mut state, &rules, &mut rng);
            state.ball.vel
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first.x.abs(), BALL_SPEED);
        assert!(first.y.abs() <= 3.0);
    }

    #[test]
    fn test_jitter_paddle_nudge_within_one() {
        let rules = MatchRules {
            bounce: BounceMode::Jitter { seed: 9 },
            ..Default::default()
        };
        let mut rng = rules.rng();
        let mut state = running();
        state.ball = Ball {
            pos: Vec2::new(21.0, 250.0),
            vel: Vec2::new(-5.0, 5.0),
        };
        tick(&mut state, &rules, &mut rng);
        assert_eq!(state.ball.vel.x, 5.0);
        assert!((state.ball.vel.y - 5.0).abs() <= 1.0);
    }

    proptest! {
        #[test]
        fn scores_stay_in_bounds(
            moves in proptest::collection::vec((0u8..5, any::<bool>()), 1..3000)
        ) {
            let (rules, mut rng) = steady();
            let mut state = running();
            for (action, up) in moves {
                let step = if up { -PADDLE_STEP } else { PADDLE_STEP };
                match action {
                    0 => state.left.shift(step),
                    1 => state.right.shift(step),
                    _ => {}
                }
                let was_running = state.phase == MatchPhase::Running;
                let events = tick(&mut state, &rules, &mut rng);
                prop_assert!(state.score_left <= WINNING_SCORE);
                prop_assert!(state.score_right <= WINNING_SCORE);

                let ended = events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::MatchEnded { .. }))
                    .count();
                let at_max = state.score_left == WINNING_SCORE
                    || state.score_right == WINNING_SCORE;
                if was_running {
                    prop_assert_eq!(ended == 1, at_max);
                }
                if state.phase == MatchPhase::Ended {
                    state.new_rally();
                    state.phase = MatchPhase::Running;
                }
            }
        }

        #[test]
        fn ball_stays_between_walls(
            y in 0.0f32..485.0,
            vy in -12.0f32..12.0,
        ) {
            let (rules, mut rng) = steady();
            let mut state = running();
            state.ball = Ball { pos: Vec2::new(400.0, y), vel: Vec2::new(0.0, vy) };
            for _ in 0..200 {
                tick(&mut state, &rules, &mut rng);
                prop_assert!(state.ball.pos.y >= 0.0);
                prop_assert!(state.ball.pos.y <= FIELD_HEIGHT - BALL_SIZE);
            }
        }
    }
}
