//! Debug overlay for the simulation.
//!
//! Toggle with F3 during gameplay. Shows:
//! - The bird's real and buffered hitboxes
//! - Pipe rectangles and gap bounds
//! - Ground and ceiling kill lines
//! - A text readout of the frame snapshot

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    config::{GameConfig, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, to_world},
    difficulty::DifficultySettings,
    polish::ParticlePool,
    powerups::ActiveEffects,
    snapshot::FrameSnapshot,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugOverlayVisible>();

    // Toggle debug with F3
    app.add_systems(
        Update,
        toggle_debug.run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::F3))),
    );

    app.add_systems(
        Update,
        (draw_hitboxes, update_readout)
            .run_if(in_state(Screen::Gameplay).and(debug_visible)),
    );
}

/// Resource to track if the debug overlay is visible.
#[derive(Resource, Default)]
pub struct DebugOverlayVisible(pub bool);

/// Marker for the readout text entity.
#[derive(Component)]
struct DebugReadout;

fn debug_visible(debug: Res<DebugOverlayVisible>) -> bool {
    debug.0
}

fn toggle_debug(
    mut commands: Commands,
    mut debug: ResMut<DebugOverlayVisible>,
    readouts: Query<Entity, With<DebugReadout>>,
) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug overlay: {}", state);

    if debug.0 {
        commands.spawn((
            Name::new("Debug Readout"),
            DebugReadout,
            Text2d::new(""),
            TextFont {
                font_size: 11.0,
                ..default()
            },
            TextColor(css::SPRING_GREEN.into()),
            // Left-ish column, above everything.
            Transform::from_translation(to_world(Vec2::new(70.0, 150.0)).extend(9.0)),
            DespawnOnExit(Screen::Gameplay),
        ));
    } else {
        for entity in &readouts {
            commands.entity(entity).despawn();
        }
    }
}

/// Draw every box the collision pass actually tests.
fn draw_hitboxes(
    mut gizmos: Gizmos,
    config: Res<GameConfig>,
    effects: Res<ActiveEffects>,
    snapshot: Res<FrameSnapshot>,
) {
    // Kill lines.
    let floor = to_world(Vec2::new(0.0, config.floor())).y;
    let ceiling = to_world(Vec2::ZERO).y;
    let half_width = PLAYFIELD_WIDTH / 2.0;
    gizmos.line_2d(
        Vec2::new(-half_width, floor),
        Vec2::new(half_width, floor),
        css::RED.with_alpha(0.8),
    );
    gizmos.line_2d(
        Vec2::new(-half_width, ceiling),
        Vec2::new(half_width, ceiling),
        css::RED.with_alpha(0.8),
    );

    // The bird's full box, and the buffered box the pipe test uses.
    if let Some(bird) = snapshot.bird {
        let scale = effects.bird_scale();
        let size = bird.size * scale;
        let center = bird.position + bird.size / 2.0;
        gizmos.rect_2d(
            Isometry2d::from_translation(to_world(center)),
            size,
            css::WHITE.with_alpha(0.6),
        );
        gizmos.rect_2d(
            Isometry2d::from_translation(to_world(center)),
            size - Vec2::splat(config.collision_buffer * 2.0),
            css::LIMEGREEN.with_alpha(0.8),
        );
    }

    // Pipe halves.
    for pipe in &snapshot.pipes {
        let color = if pipe.passed {
            css::GRAY.with_alpha(0.5)
        } else {
            css::ORANGE.with_alpha(0.8)
        };

        let top_center = Vec2::new(pipe.x + pipe.width / 2.0, pipe.gap_y / 2.0);
        gizmos.rect_2d(
            Isometry2d::from_translation(to_world(top_center)),
            Vec2::new(pipe.width, pipe.gap_y),
            color,
        );

        let bottom_top = pipe.gap_y + pipe.gap_height;
        let floor = PLAYFIELD_HEIGHT - config.ground_height;
        let bottom_center = Vec2::new(pipe.x + pipe.width / 2.0, (bottom_top + floor) / 2.0);
        gizmos.rect_2d(
            Isometry2d::from_translation(to_world(bottom_center)),
            Vec2::new(pipe.width, floor - bottom_top),
            color,
        );
    }
}

/// Refresh the text readout from the latest snapshot.
fn update_readout(
    config: Res<GameConfig>,
    snapshot: Res<FrameSnapshot>,
    effects: Res<ActiveEffects>,
    particles: Res<ParticlePool>,
    mut readouts: Query<&mut Text2d, With<DebugReadout>>,
) {
    let Ok(mut text) = readouts.single_mut() else {
        return;
    };

    let settings = DifficultySettings::for_score(snapshot.score, &config);
    let bird_line = match snapshot.bird {
        Some(bird) => format!("bird y={:6.1} vy={:5.2}", bird.position.y, bird.velocity.y),
        None => "bird -".to_string(),
    };
    let effects_line = {
        let labels = effects.labels();
        if labels.is_empty() {
            "none".to_string()
        } else {
            labels.join(", ")
        }
    };

    text.0 = format!(
        "{bird_line}\n\
         pipes {} | score {} | best {}\n\
         started {} | over {} | particles {}\n\
         speed {:.1} gap {:.0} every {}ms\n\
         effects: {effects_line}",
        snapshot.pipes.len(),
        snapshot.score,
        snapshot.high_score,
        snapshot.started(),
        snapshot.game_over(),
        particles.live(),
        settings.pipe_speed,
        settings.pipe_gap,
        settings.spawn_interval.as_millis(),
    );
}
