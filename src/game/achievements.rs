//! Lifetime stats and achievements.
//!
//! Progress accumulates across runs and is saved alongside the leaderboard.
//! Checks run when the score moves and again when a run ends, so both
//! single-run and lifetime milestones unlock the moment they are earned.

use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    config::to_world,
    phase::RunEnded,
    powerups::PowerUpCollected,
    score::GameScore,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PlayerProgress>();

    app.add_systems(Startup, load_progress);
    app.add_systems(
        Update,
        (
            track_powerups,
            check_achievements.run_if(resource_changed::<GameScore>),
            absorb_run,
            animate_toasts,
        )
            .run_if(in_state(Screen::Gameplay)),
    );
}

/// The eight milestones, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    FirstFlight,
    HighFlyer,
    AcePilot,
    Legendary,
    PowerUser,
    Perfectionist,
    Veteran,
    PipeMaster,
}

impl Achievement {
    pub const ALL: [Achievement; 8] = [
        Achievement::FirstFlight,
        Achievement::HighFlyer,
        Achievement::AcePilot,
        Achievement::Legendary,
        Achievement::PowerUser,
        Achievement::Perfectionist,
        Achievement::Veteran,
        Achievement::PipeMaster,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstFlight => "First Flight",
            Achievement::HighFlyer => "High Flyer",
            Achievement::AcePilot => "Ace Pilot",
            Achievement::Legendary => "Legendary",
            Achievement::PowerUser => "Power User",
            Achievement::Perfectionist => "Perfectionist",
            Achievement::Veteran => "Veteran",
            Achievement::PipeMaster => "Pipe Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstFlight => "Score your first point",
            Achievement::HighFlyer => "Score 10 points in a single game",
            Achievement::AcePilot => "Score 25 points in a single game",
            Achievement::Legendary => "Score 50 points in a single game",
            Achievement::PowerUser => "Collect 10 power-ups total",
            Achievement::Perfectionist => "Score 10+ without using power-ups",
            Achievement::Veteran => "Play 50 games",
            Achievement::PipeMaster => "Pass through 500 pipes total",
        }
    }

    /// Is this milestone satisfied by the given lifetime stats and live run?
    pub fn is_met(&self, stats: &GameStats, run: &GameScore) -> bool {
        match self {
            Achievement::FirstFlight => stats.total_score + run.score > 0,
            Achievement::HighFlyer => run.score >= 10,
            Achievement::AcePilot => run.score >= 25,
            Achievement::Legendary => run.score >= 50,
            Achievement::PowerUser => stats.total_powerups >= 10,
            Achievement::Perfectionist => stats.perfect_games > 0,
            Achievement::Veteran => stats.total_games >= 50,
            Achievement::PipeMaster => stats.total_pipes + run.pipes_passed >= 500,
        }
    }
}

/// Lifetime counters, accumulated at run end (power-ups count live).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GameStats {
    pub total_games: u32,
    pub total_score: u32,
    pub total_pipes: u32,
    pub total_powerups: u32,
    /// Runs that reached 10 points without a single power-up.
    pub perfect_games: u32,
}

/// Resource holding lifetime stats and unlocked achievements, persisted as
/// one JSON file.
#[derive(Resource, Debug, Default, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub stats: GameStats,
    pub unlocked: Vec<Achievement>,
}

impl PlayerProgress {
    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    /// Unlock everything newly satisfied; returns what changed.
    pub fn check(&mut self, run: &GameScore) -> Vec<Achievement> {
        let mut newly = Vec::new();
        for achievement in Achievement::ALL {
            if !self.is_unlocked(achievement) && achievement.is_met(&self.stats, run) {
                self.unlocked.push(achievement);
                newly.push(achievement);
                info!("Achievement unlocked: {}", achievement.name());
            }
        }
        newly
    }

    /// Fold a finished run into the lifetime counters.
    pub fn absorb(&mut self, run: &GameScore) {
        self.stats.total_games += 1;
        self.stats.total_score += run.score;
        self.stats.total_pipes += run.pipes_passed;
        if run.score >= 10 && run.powerups_collected == 0 {
            self.stats.perfect_games += 1;
        }
    }

    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("flappy-bird").join("progress.json"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for progress");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(progress) => {
                    info!("Loaded progress from {:?}", path);
                    progress
                }
                Err(e) => {
                    warn!("Failed to parse progress: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read progress file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for saving progress");
            return;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create progress directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(&path, json) {
                Ok(()) => info!("Saved progress to {:?}", path),
                Err(e) => warn!("Failed to write progress: {}", e),
            },
            Err(e) => warn!("Failed to serialize progress: {}", e),
        }
    }
}

/// Floating unlock banner.
#[derive(Component)]
struct AchievementToast {
    timer: f32,
}

const TOAST_DURATION: f32 = 2.5;

fn load_progress(mut progress: ResMut<PlayerProgress>) {
    *progress = PlayerProgress::load();
}

/// Power-ups count toward lifetime totals as they are grabbed.
fn track_powerups(
    mut progress: ResMut<PlayerProgress>,
    mut collected: MessageReader<PowerUpCollected>,
) {
    for _ in collected.read() {
        progress.stats.total_powerups += 1;
    }
}

/// Unlock mid-run milestones as the score climbs.
fn check_achievements(
    mut commands: Commands,
    mut progress: ResMut<PlayerProgress>,
    score: Res<GameScore>,
) {
    let newly = progress.check(&score);
    if newly.is_empty() {
        return;
    }
    progress.save();
    for achievement in newly {
        spawn_toast(&mut commands, achievement);
    }
}

/// Fold the run into lifetime stats when it ends, then re-check.
fn absorb_run(
    mut commands: Commands,
    mut ended: MessageReader<RunEnded>,
    mut progress: ResMut<PlayerProgress>,
    score: Res<GameScore>,
) {
    for _ in ended.read() {
        progress.absorb(&score);
        let newly = progress.check(&score);
        for achievement in newly {
            spawn_toast(&mut commands, achievement);
        }
        progress.save();
    }
}

fn spawn_toast(commands: &mut Commands, achievement: Achievement) {
    commands.spawn((
        Name::new("Achievement Toast"),
        AchievementToast { timer: 0.0 },
        Text2d::new(format!(
            "{}\n{}",
            achievement.name(),
            achievement.description()
        )),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.84, 0.0)),
        Transform::from_translation(to_world(Vec2::new(144.0, 110.0)).extend(7.0)),
        DespawnOnExit(Screen::Gameplay),
    ));
}

/// Float toasts up and fade them out.
fn animate_toasts(
    mut commands: Commands,
    time: Res<Time>,
    mut toasts: Query<(Entity, &mut AchievementToast, &mut Transform, &mut TextColor)>,
) {
    for (entity, mut toast, mut transform, mut color) in &mut toasts {
        toast.timer += time.delta_secs();
        let progress = (toast.timer / TOAST_DURATION).min(1.0);

        transform.translation.y += 12.0 * time.delta_secs();

        let alpha = if progress > 0.7 {
            1.0 - (progress - 0.7) / 0.3
        } else {
            1.0
        };
        color.0 = color.0.with_alpha(alpha);

        if progress >= 1.0 {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with_score(score: u32) -> GameScore {
        GameScore {
            score,
            pipes_passed: score,
            ..default()
        }
    }

    #[test]
    fn single_run_milestones() {
        let stats = GameStats::default();
        assert!(!Achievement::HighFlyer.is_met(&stats, &run_with_score(9)));
        assert!(Achievement::HighFlyer.is_met(&stats, &run_with_score(10)));
        assert!(Achievement::AcePilot.is_met(&stats, &run_with_score(25)));
        assert!(Achievement::Legendary.is_met(&stats, &run_with_score(50)));
    }

    #[test]
    fn lifetime_milestones() {
        let mut stats = GameStats::default();
        let idle = run_with_score(0);

        assert!(!Achievement::Veteran.is_met(&stats, &idle));
        stats.total_games = 50;
        assert!(Achievement::Veteran.is_met(&stats, &idle));

        stats.total_powerups = 10;
        assert!(Achievement::PowerUser.is_met(&stats, &idle));

        stats.total_pipes = 499;
        assert!(!Achievement::PipeMaster.is_met(&stats, &idle));
        stats.total_pipes = 500;
        assert!(Achievement::PipeMaster.is_met(&stats, &idle));
    }

    #[test]
    fn check_unlocks_each_achievement_once() {
        let mut progress = PlayerProgress::default();
        let run = run_with_score(12);

        let first = progress.check(&run);
        assert!(first.contains(&Achievement::FirstFlight));
        assert!(first.contains(&Achievement::HighFlyer));

        // A second pass over the same state unlocks nothing new.
        assert!(progress.check(&run).is_empty());
    }

    #[test]
    fn perfect_games_need_ten_points_and_no_powerups() {
        let mut progress = PlayerProgress::default();

        progress.absorb(&GameScore {
            score: 12,
            pipes_passed: 12,
            powerups_collected: 1,
            ..default()
        });
        assert_eq!(progress.stats.perfect_games, 0);

        progress.absorb(&run_with_score(12));
        assert_eq!(progress.stats.perfect_games, 1);
        assert!(Achievement::Perfectionist.is_met(&progress.stats, &run_with_score(0)));
    }

    #[test]
    fn absorb_accumulates_totals() {
        let mut progress = PlayerProgress::default();
        progress.absorb(&run_with_score(3));
        progress.absorb(&run_with_score(7));

        assert_eq!(progress.stats.total_games, 2);
        assert_eq!(progress.stats.total_score, 10);
        assert_eq!(progress.stats.total_pipes, 10);
    }
}
