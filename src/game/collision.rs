//! Collision tests for the bird against the world.
//!
//! Three independent predicates: ground, ceiling, pipe. Any one of them
//! ending up true while a run is live ends the run. The pipe test shrinks
//! the bird's box by a small buffer first so clipped corners don't read as
//! unfair hits.

use bevy::prelude::*;

use super::{
    SimSet,
    bird::Bird,
    config::{GameConfig, PLAYFIELD_HEIGHT},
    phase::{GamePhase, RunEnded},
    pipes::Pipe,
    powerups::ActiveEffects,
    score::GameScore,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, check_collisions.in_set(SimSet::Collision));
}

/// Has the bird's box reached the ground surface?
pub fn hits_ground(bird: &Bird, playfield_height: f32, ground_height: f32) -> bool {
    bird.position.y + bird.size.y >= playfield_height - ground_height
}

/// Has the bird's box reached the top of the playfield?
pub fn hits_ceiling(bird: &Bird) -> bool {
    bird.position.y <= 0.0
}

/// AABB test of the bird against a pipe's two halves, with `buffer` pixels
/// of forgiveness shaved off every side of the bird first.
pub fn hits_pipe(bird: &Bird, pipe: &Pipe, buffer: f32) -> bool {
    let bird_left = bird.position.x + buffer;
    let bird_right = bird.position.x + bird.size.x - buffer;
    let bird_top = bird.position.y + buffer;
    let bird_bottom = bird.position.y + bird.size.y - buffer;

    let pipe_left = pipe.x;
    let pipe_right = pipe.x + pipe.width;
    let gap_top = pipe.gap_y;
    let gap_bottom = pipe.gap_y + pipe.gap_height;

    bird_right > pipe_left
        && bird_left < pipe_right
        && (bird_top < gap_top || bird_bottom > gap_bottom)
}

/// End the run when the bird hits anything. Runs against the pipe set from
/// before this tick's spawn, right after the physics step.
fn check_collisions(
    config: Res<GameConfig>,
    effects: Res<ActiveEffects>,
    score: Res<GameScore>,
    bird: Single<&Bird>,
    pipes: Query<&Pipe>,
    mut next_phase: ResMut<NextState<GamePhase>>,
    mut run_ended: MessageWriter<RunEnded>,
) {
    let bird = bird.scaled(effects.bird_scale());

    let grounded = hits_ground(&bird, PLAYFIELD_HEIGHT, config.ground_height);
    let ceiling = hits_ceiling(&bird);
    // The shield only forgives pipes; the ground and ceiling always count.
    let piped = !effects.shielded()
        && pipes
            .iter()
            .any(|pipe| hits_pipe(&bird, pipe, config.collision_buffer));

    if grounded || ceiling || piped {
        info!(
            "Collision (ground: {grounded}, ceiling: {ceiling}, pipe: {piped}), final score: {}",
            score.score
        );
        next_phase.set(GamePhase::GameOver);
        run_ended.write(RunEnded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUFFER: f32 = 4.0;

    fn bird_at(x: f32, y: f32) -> Bird {
        Bird {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            size: Vec2::splat(40.0),
        }
    }

    fn pipe_at(x: f32) -> Pipe {
        Pipe {
            x,
            width: 80.0,
            gap_y: 100.0,
            gap_height: 180.0,
            passed: false,
            seq: 0,
        }
    }

    #[test]
    fn no_hit_without_horizontal_overlap() {
        // Bird right edge at 90, pipe left edge at 100.
        let bird = bird_at(50.0, 150.0);
        assert!(!hits_pipe(&bird, &pipe_at(100.0), BUFFER));
    }

    #[test]
    fn no_hit_inside_the_gap() {
        // Horizontally aligned, vertical box fully inside [100, 280].
        let bird = bird_at(50.0, 150.0);
        assert!(!hits_pipe(&bird, &pipe_at(60.0), BUFFER));
    }

    #[test]
    fn hit_above_the_gap() {
        let bird = bird_at(50.0, 50.0);
        assert!(hits_pipe(&bird, &pipe_at(60.0), BUFFER));
    }

    #[test]
    fn hit_below_the_gap() {
        let bird = bird_at(50.0, 270.0);
        assert!(hits_pipe(&bird, &pipe_at(60.0), BUFFER));
    }

    #[test]
    fn buffer_forgives_shallow_overlap() {
        let pipe = pipe_at(60.0);

        // The unshrunk box pokes 2 px above the gap, less than the buffer.
        let grazing = bird_at(50.0, 98.0);
        assert!(!hits_pipe(&grazing, &pipe, BUFFER));

        // 6 px above the gap is past the buffer and must register.
        let overlapping = bird_at(50.0, 94.0);
        assert!(hits_pipe(&overlapping, &pipe, BUFFER));
    }

    #[test]
    fn ground_and_ceiling_edges() {
        let config = GameConfig::default();

        let resting = bird_at(50.0, config.floor() - 40.0);
        assert!(hits_ground(&resting, PLAYFIELD_HEIGHT, config.ground_height));

        let above = bird_at(50.0, config.floor() - 41.0);
        assert!(!hits_ground(&above, PLAYFIELD_HEIGHT, config.ground_height));

        assert!(hits_ceiling(&bird_at(50.0, 0.0)));
        assert!(!hits_ceiling(&bird_at(50.0, 0.1)));
    }

    #[test]
    fn unbroken_fall_ends_on_the_ground() {
        // Start a fresh run and let gravity run its course with no flaps.
        let config = GameConfig {
            gravity: 0.3,
            jump_strength: -4.5,
            ..default()
        };
        let mut bird = Bird::new(&config);
        let mut ticks = 0;

        while !hits_ground(&bird, PLAYFIELD_HEIGHT, config.ground_height) {
            bird = bird.step(config.gravity, config.max_fall_velocity, config.floor());
            ticks += 1;
            assert!(ticks <= 100, "bird should reach the ground within 100 ticks");
        }

        // The clamp leaves the bird resting exactly on the ground surface.
        assert_eq!(bird.position.y, config.floor() - bird.size.y);
    }

    #[test]
    fn pipe_scenario_walkthrough() {
        // A pipe approaching from the right: no overlap, then safe passage
        // through the gap, then a hit once the bird rises above it.
        let bird = bird_at(50.0, 150.0);
        let mut pipe = pipe_at(100.0);
        assert!(!hits_pipe(&bird, &pipe, BUFFER));

        while bird.position.x + bird.size.x <= pipe.x {
            pipe.x -= 2.5;
        }
        assert!(!hits_pipe(&bird, &pipe, BUFFER));

        let high = bird_at(50.0, 50.0);
        assert!(hits_pipe(&high, &pipe, BUFFER));
    }
}
