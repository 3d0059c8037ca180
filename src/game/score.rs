//! Score bookkeeping for the current run, and the in-world HUD.

use bevy::prelude::*;

use super::{
    SimSet,
    config::{PLAYFIELD_HEIGHT, to_world},
    difficulty::Tier,
    highscore::{HighScores, ScoreEntry},
    phase::{GamePhase, RunEnded},
    pipes::PipePassed,
    powerups::PowerUpCollected,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameScore>();
    app.register_type::<GameScore>();

    app.add_systems(OnEnter(GamePhase::Playing), reset_score);
    app.add_systems(OnEnter(Screen::Gameplay), spawn_hud);

    app.add_systems(FixedUpdate, update_score.in_set(SimSet::World));
    app.add_systems(
        Update,
        (finalize_run, update_hud).run_if(in_state(Screen::Gameplay)),
    );
}

/// Resource tracking the current run.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct GameScore {
    pub score: u32,
    pub pipes_passed: u32,
    pub powerups_collected: u32,
    /// Set at run end if this run beat the leaderboard.
    pub new_best: bool,
}

impl GameScore {
    pub fn reset(&mut self) {
        self.score = 0;
        self.pipes_passed = 0;
        self.powerups_collected = 0;
        self.new_best = false;
    }
}

/// Marker for the HUD score line.
#[derive(Component)]
struct ScoreText;

/// Marker for the HUD difficulty line.
#[derive(Component)]
struct TierText;

/// Reset the run counters when a new run starts.
fn reset_score(mut score: ResMut<GameScore>) {
    score.reset();
    info!("Score reset");
}

/// Count cleared pipes and collected pickups.
fn update_score(
    mut score: ResMut<GameScore>,
    mut passed: MessageReader<PipePassed>,
    mut collected: MessageReader<PowerUpCollected>,
) {
    for _ in passed.read() {
        score.score += 1;
        score.pipes_passed += 1;
        info!("Scored! Total: {}", score.score);
    }
    for _ in collected.read() {
        score.powerups_collected += 1;
    }
}

/// Commit the run to the leaderboard the moment it ends. This runs exactly
/// once per run; the score is frozen by then.
fn finalize_run(
    mut ended: MessageReader<RunEnded>,
    mut score: ResMut<GameScore>,
    mut high_scores: ResMut<HighScores>,
) {
    for _ in ended.read() {
        score.new_best = score.score > high_scores.best();
        let entry = ScoreEntry::new(score.score, score.powerups_collected);
        if high_scores.record(entry) {
            info!("New leaderboard entry: {}", score.score);
            high_scores.save();
        }
    }
}

/// Spawn the score readout above the playfield.
fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("Score Text"),
        ScoreText,
        Text2d::new("0"),
        TextFont {
            font_size: 36.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Transform::from_translation(to_world(Vec2::new(144.0, 40.0)).extend(6.0)),
        DespawnOnExit(Screen::Gameplay),
    ));

    commands.spawn((
        Name::new("Tier Text"),
        TierText,
        Text2d::new("Easy"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Transform::from_translation(to_world(Vec2::new(144.0, 68.0)).extend(6.0)),
        DespawnOnExit(Screen::Gameplay),
    ));

    // Best-so-far sits under the playfield, over the ground strip.
    commands.spawn((
        Name::new("Best Text"),
        BestText,
        Text2d::new("Best: 0"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.95, 0.85)),
        Transform::from_translation(
            to_world(Vec2::new(144.0, PLAYFIELD_HEIGHT - 30.0)).extend(6.0),
        ),
        DespawnOnExit(Screen::Gameplay),
    ));
}

/// Marker for the HUD best-score line.
#[derive(Component)]
struct BestText;

fn update_hud(
    score: Res<GameScore>,
    high_scores: Res<HighScores>,
    mut score_text: Query<&mut Text2d, (With<ScoreText>, Without<TierText>, Without<BestText>)>,
    mut tier_text: Query<
        (&mut Text2d, &mut TextColor),
        (With<TierText>, Without<ScoreText>, Without<BestText>),
    >,
    mut best_text: Query<&mut Text2d, (With<BestText>, Without<ScoreText>, Without<TierText>)>,
) {
    for mut text in &mut score_text {
        text.0 = score.score.to_string();
    }
    let tier = Tier::for_score(score.score);
    for (mut text, mut color) in &mut tier_text {
        text.0 = tier.label().to_string();
        color.0 = tier.color();
    }
    for mut text in &mut best_text {
        text.0 = format!("Best: {}", high_scores.best());
    }
}
