//! The sky and the scrolling ground strip.
//!
//! The sky color follows a day/night cycle driven by the score, and the
//! ground scrolls at pipe speed while a run is live so the world reads as
//! moving even though the bird never does.

use bevy::prelude::*;

use super::{
    SimSet,
    config::{GameConfig, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH},
    difficulty::DifficultySettings,
    powerups::ActiveEffects,
    score::GameScore,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GroundOffset>();

    app.add_systems(OnEnter(Screen::Gameplay), spawn_backdrop);
    app.add_systems(FixedUpdate, scroll_ground.in_set(SimSet::World));
    app.add_systems(
        Update,
        (update_sky, sync_ground_tiles).run_if(in_state(Screen::Gameplay)),
    );
}

const GROUND_COLOR: Color = Color::srgb(0.87, 0.84, 0.58);
const GROUND_EDGE_COLOR: Color = Color::srgb(0.45, 0.78, 0.29);

/// Phases of the score-driven sky cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Dawn,
    Day,
    Sunset,
    Night,
}

/// Points spent in each phase before the sky moves on.
const POINTS_PER_PHASE: u32 = 15;

impl TimeOfDay {
    /// Cycles Dawn → Day → Sunset → Night, every 15 points.
    pub fn for_score(score: u32) -> Self {
        match (score / POINTS_PER_PHASE) % 4 {
            0 => TimeOfDay::Dawn,
            1 => TimeOfDay::Day,
            2 => TimeOfDay::Sunset,
            _ => TimeOfDay::Night,
        }
    }

    pub fn sky_color(&self) -> Color {
        match self {
            TimeOfDay::Dawn => Color::srgb(1.0, 0.71, 0.76),
            TimeOfDay::Day => Color::srgb(0.31, 0.75, 0.79),
            TimeOfDay::Sunset => Color::srgb(0.99, 0.72, 0.07),
            TimeOfDay::Night => Color::srgb(0.05, 0.08, 0.27),
        }
    }
}

/// How far the ground has scrolled, wrapped at one playfield width.
#[derive(Resource, Default)]
pub struct GroundOffset(pub f32);

/// Marker for the sky sprite.
#[derive(Component)]
struct Sky;

/// Marker for a ground tile; the index places it left or right.
#[derive(Component)]
struct GroundTile(usize);

fn spawn_backdrop(mut commands: Commands, config: Res<GameConfig>) {
    let sky_height = PLAYFIELD_HEIGHT - config.ground_height;

    commands.spawn((
        Name::new("Sky"),
        Sky,
        Sprite::from_color(
            TimeOfDay::Dawn.sky_color(),
            Vec2::new(PLAYFIELD_WIDTH, sky_height),
        ),
        // Top of the playfield; pipes draw in front of it.
        Transform::from_xyz(0.0, config.ground_height / 2.0, -10.0),
        DespawnOnExit(Screen::Gameplay),
    ));

    // Two tiles make the scroll seamless: as one slides off the left edge
    // the other is already covering the right.
    for index in 0..2 {
        commands.spawn((
            Name::new(format!("Ground Tile {index}")),
            GroundTile(index),
            Sprite::from_color(
                GROUND_COLOR,
                Vec2::new(PLAYFIELD_WIDTH, config.ground_height),
            ),
            Transform::from_xyz(
                index as f32 * PLAYFIELD_WIDTH,
                -(PLAYFIELD_HEIGHT - config.ground_height) / 2.0,
                4.0,
            ),
            DespawnOnExit(Screen::Gameplay),
            children![(
                Name::new("Grass Lip"),
                Sprite::from_color(GROUND_EDGE_COLOR, Vec2::new(PLAYFIELD_WIDTH, 8.0)),
                Transform::from_xyz(0.0, config.ground_height / 2.0 - 4.0, 0.1),
            )],
        ));
    }
}

/// Advance the parallax offset at the world's pace.
fn scroll_ground(
    config: Res<GameConfig>,
    score: Res<GameScore>,
    effects: Res<ActiveEffects>,
    mut offset: ResMut<GroundOffset>,
) {
    let settings = DifficultySettings::for_score(score.score, &config);
    offset.0 = (offset.0 + settings.pipe_speed * effects.speed_factor()) % PLAYFIELD_WIDTH;
}

/// Tint the sky for the current time of day.
fn update_sky(score: Res<GameScore>, mut sky: Query<&mut Sprite, With<Sky>>) {
    let color = TimeOfDay::for_score(score.score).sky_color();
    for mut sprite in &mut sky {
        sprite.color = color;
    }
}

fn sync_ground_tiles(
    offset: Res<GroundOffset>,
    mut tiles: Query<(&GroundTile, &mut Transform)>,
) {
    for (tile, mut transform) in &mut tiles {
        transform.translation.x = tile.0 as f32 * PLAYFIELD_WIDTH - offset.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_cycles_every_fifteen_points() {
        assert_eq!(TimeOfDay::for_score(0), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::for_score(14), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::for_score(15), TimeOfDay::Day);
        assert_eq!(TimeOfDay::for_score(30), TimeOfDay::Sunset);
        assert_eq!(TimeOfDay::for_score(45), TimeOfDay::Night);
        // The cycle wraps back to dawn.
        assert_eq!(TimeOfDay::for_score(60), TimeOfDay::Dawn);
    }
}
