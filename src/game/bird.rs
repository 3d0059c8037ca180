//! The player-controlled bird.
//!
//! The bird only ever moves vertically; the world scrolls past it. Each
//! fixed tick gravity accelerates it toward the ground, a flap replaces its
//! velocity with a fixed upward impulse, and its position is clamped to the
//! space between the ceiling and the ground.

use bevy::prelude::*;

use super::{
    SimSet,
    config::{GameConfig, to_world},
    difficulty::DifficultySettings,
    phase::GamePhase,
    powerups::ActiveEffects,
    score::GameScore,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bird>();

    app.add_systems(OnEnter(GamePhase::Playing), respawn_bird);
    app.add_systems(FixedUpdate, apply_physics.in_set(SimSet::Physics));
    app.add_systems(
        Update,
        sync_bird_transform.run_if(in_state(Screen::Gameplay)),
    );
}

/// Body color of the bird sprite.
const BIRD_COLOR: Color = Color::srgb(1.0, 0.84, 0.0);

/// The player avatar. Position is the top-left corner of its bounding box in
/// playfield coordinates.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Bird {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
}

impl Bird {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            position: config.bird_start,
            velocity: Vec2::ZERO,
            size: Vec2::splat(config.bird_size),
        }
    }

    /// One gravity step: accelerate, cap the fall speed, move, then clamp to
    /// the space between the ceiling and the ground surface.
    pub fn step(&self, gravity: f32, max_fall_velocity: f32, floor: f32) -> Self {
        let vy = (self.velocity.y + gravity).min(max_fall_velocity);
        let y = (self.position.y + vy).clamp(0.0, floor - self.size.y);
        Self {
            position: Vec2::new(self.position.x, y),
            velocity: Vec2::new(self.velocity.x, vy),
            ..*self
        }
    }

    /// An instantaneous upward impulse. The new velocity is a snapshot of the
    /// configured strength, never added to the current one.
    pub fn flap(&self, jump_strength: f32) -> Self {
        Self {
            velocity: Vec2::new(self.velocity.x, jump_strength),
            ..*self
        }
    }

    /// The same bird with its box scaled around its center. Used for the
    /// size-reduction power-up so the stored box stays untouched.
    pub fn scaled(&self, factor: f32) -> Self {
        let size = self.size * factor;
        let position = self.position + (self.size - size) / 2.0;
        Self {
            position,
            size,
            ..*self
        }
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }
}

/// Reset the bird for a new run.
fn respawn_bird(
    mut commands: Commands,
    config: Res<GameConfig>,
    existing: Query<Entity, With<Bird>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    commands.spawn((
        Name::new("Bird"),
        Bird::new(&config),
        Sprite::from_color(BIRD_COLOR, Vec2::splat(config.bird_size)),
        Transform::from_translation(to_world(config.bird_start).extend(2.0)),
        DespawnOnExit(Screen::Gameplay),
    ));
}

/// Advance the bird one tick under the current difficulty's gravity.
fn apply_physics(
    config: Res<GameConfig>,
    score: Res<GameScore>,
    mut bird: Single<&mut Bird>,
) {
    let settings = DifficultySettings::for_score(score.score, &config);
    let next = bird.step(settings.gravity, config.max_fall_velocity, config.floor());
    **bird = next;
}

/// Mirror the playfield state into the render transform. The tilt follows
/// vertical velocity: nose up right after a flap, nose down in free fall.
fn sync_bird_transform(
    effects: Res<ActiveEffects>,
    mut query: Query<(&Bird, &mut Transform)>,
) {
    for (bird, mut transform) in &mut query {
        let scaled = bird.scaled(effects.bird_scale());
        transform.translation = to_world(scaled.center()).extend(2.0);
        transform.scale = Vec3::splat(effects.bird_scale());

        let degrees = (bird.velocity.y * 2.5).clamp(-25.0, 90.0);
        transform.rotation = Quat::from_rotation_z(-degrees.to_radians());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bird() -> Bird {
        Bird::new(&GameConfig::default())
    }

    #[test]
    fn gravity_accelerates_until_terminal_velocity() {
        let mut bird = test_bird();
        for _ in 0..100 {
            bird = bird.step(0.3, 12.0, 400.0);
            assert!(bird.velocity.y <= 12.0);
        }
        assert_eq!(bird.velocity.y, 12.0);
    }

    #[test]
    fn position_stays_clamped_to_playfield() {
        let config = GameConfig::default();
        let mut bird = test_bird();
        for _ in 0..1000 {
            bird = bird.step(0.3, 12.0, config.floor());
            assert!(bird.position.y >= 0.0);
            assert!(bird.position.y <= config.floor() - bird.size.y);
        }
        // After falling for this long the bird is resting on the ground.
        assert_eq!(bird.position.y, config.floor() - bird.size.y);
    }

    #[test]
    fn rising_bird_clamps_at_ceiling() {
        // An impulse that would carry the bird past the top of the field.
        let mut bird = test_bird();
        bird.velocity.y = -250.0;
        bird = bird.step(0.3, 12.0, 400.0);
        assert_eq!(bird.position.y, 0.0);
    }

    #[test]
    fn flap_replaces_velocity_instead_of_adding() {
        let bird = test_bird();

        let falling = Bird {
            velocity: Vec2::new(0.0, 11.0),
            ..bird
        };
        assert_eq!(falling.flap(-7.0).velocity.y, -7.0);

        // A second flap in the same state lands on the same value.
        assert_eq!(falling.flap(-7.0).flap(-7.0).velocity.y, -7.0);

        let rising = Bird {
            velocity: Vec2::new(0.0, -3.0),
            ..bird
        };
        assert_eq!(rising.flap(-7.0).velocity.y, -7.0);
    }

    #[test]
    fn scaled_box_shrinks_around_center() {
        let bird = test_bird();
        let tiny = bird.scaled(0.5);
        assert_eq!(tiny.size, bird.size * 0.5);
        assert_eq!(tiny.center(), bird.center());
    }
}
