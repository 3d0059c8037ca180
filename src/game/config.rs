//! Gameplay configuration.
//!
//! Every tunable lives in [`GameConfig`] so the simulation code never
//! hardcodes a number. The simulation runs in "playfield space": a 288x512
//! field with the origin at the top-left corner and y growing downward,
//! advanced once per fixed tick. Velocities are px/tick, accelerations
//! px/tick^2.

use std::time::Duration;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameConfig>();
    app.register_type::<GameConfig>();
}

/// Width of the playfield in pixels.
pub const PLAYFIELD_WIDTH: f32 = 288.0;

/// Height of the playfield in pixels, ground strip included.
pub const PLAYFIELD_HEIGHT: f32 = 512.0;

/// Map a playfield point to a world position.
///
/// The playfield is centered on the camera, so this flips y and shifts the
/// origin from the top-left corner to the middle of the field.
pub fn to_world(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x - PLAYFIELD_WIDTH / 2.0,
        PLAYFIELD_HEIGHT / 2.0 - pos.y,
    )
}

/// All gameplay tunables. Difficulty scaling (see `difficulty`) treats these
/// as the level-0 baseline.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct GameConfig {
    /// Downward acceleration per tick, before difficulty scaling.
    pub gravity: f32,
    /// Vertical velocity snapshot applied by a flap. Negative is up.
    pub jump_strength: f32,
    /// Terminal fall velocity.
    pub max_fall_velocity: f32,
    /// Side length of the bird's bounding box.
    pub bird_size: f32,
    /// Where the bird starts (and resets to).
    pub bird_start: Vec2,
    pub pipe_width: f32,
    /// Vertical opening between pipe halves, before difficulty scaling.
    pub pipe_gap: f32,
    /// Leftward pipe speed per tick, before difficulty scaling.
    pub pipe_speed: f32,
    /// Time between pipe spawns, before difficulty scaling.
    pub spawn_interval: Duration,
    /// Minimum distance kept between the gap and the ceiling or ground.
    pub gap_margin: f32,
    /// Height of the ground strip at the bottom of the playfield.
    pub ground_height: f32,
    /// Pixels shaved off each side of the bird's box before pipe tests, so
    /// near misses feel fair.
    pub collision_buffer: f32,
    /// Chance that a newly spawned pipe brings a power-up with it.
    pub powerup_chance: f64,
    /// Side length of a power-up pickup box.
    pub powerup_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            jump_strength: -7.0,
            max_fall_velocity: 12.0,
            bird_size: 34.0,
            bird_start: Vec2::new(50.0, 200.0),
            pipe_width: 52.0,
            pipe_gap: 180.0,
            pipe_speed: 2.5,
            spawn_interval: Duration::from_millis(2000),
            gap_margin: 100.0,
            ground_height: 112.0,
            collision_buffer: 4.0,
            powerup_chance: 0.2,
            powerup_size: 40.0,
        }
    }
}

impl GameConfig {
    /// Playfield y of the ground surface.
    pub fn floor(&self) -> f32 {
        PLAYFIELD_HEIGHT - self.ground_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_mapping_flips_y() {
        // Top-left corner of the playfield lands in the upper-left quadrant.
        let corner = to_world(Vec2::ZERO);
        assert_eq!(corner, Vec2::new(-144.0, 256.0));

        // The center of the playfield is the world origin.
        let center = to_world(Vec2::new(144.0, 256.0));
        assert_eq!(center, Vec2::ZERO);
    }

    #[test]
    fn floor_sits_above_ground_strip() {
        let config = GameConfig::default();
        assert_eq!(config.floor(), 400.0);
    }
}
