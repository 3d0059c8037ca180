//! Score-driven difficulty scaling.
//!
//! Every 10 points is a level. Each level nudges speed, gap, spawn cadence,
//! and gravity toward their hard caps, so the curve only ever gets harder
//! and flattens out once the caps are reached.

use std::time::Duration;

use bevy::prelude::*;

use super::config::GameConfig;

/// Points per difficulty level.
pub const POINTS_PER_LEVEL: u32 = 10;

/// Pipe speed gained per level, and its cap.
const SPEED_STEP: f32 = 0.2;
const MAX_PIPE_SPEED: f32 = 5.5;

/// Gap pixels lost per level, and the floor.
const GAP_STEP: f32 = 5.0;
const MIN_PIPE_GAP: f32 = 120.0;

/// Spawn interval shaved off per level, and the floor.
const INTERVAL_STEP_MS: u64 = 100;
const MIN_SPAWN_INTERVAL_MS: u64 = 1200;

/// Gravity gained per level, and its cap.
const GRAVITY_STEP: f32 = 0.01;
const MAX_GRAVITY: f32 = 0.4;

/// The effective physics and spawner parameters at a given score.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultySettings {
    pub pipe_speed: f32,
    pub pipe_gap: f32,
    pub spawn_interval: Duration,
    pub gravity: f32,
}

impl DifficultySettings {
    pub fn for_score(score: u32, config: &GameConfig) -> Self {
        let level = (score / POINTS_PER_LEVEL) as f32;
        let base_interval = config.spawn_interval.as_millis() as u64;

        Self {
            pipe_speed: (config.pipe_speed + level * SPEED_STEP).min(MAX_PIPE_SPEED),
            pipe_gap: (config.pipe_gap - level * GAP_STEP).max(MIN_PIPE_GAP),
            spawn_interval: Duration::from_millis(
                base_interval
                    .saturating_sub(level as u64 * INTERVAL_STEP_MS)
                    .max(MIN_SPAWN_INTERVAL_MS),
            ),
            gravity: (config.gravity + level * GRAVITY_STEP).min(MAX_GRAVITY),
        }
    }
}

/// Coarse difficulty tier, purely for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Easy,
    Normal,
    Hard,
    Expert,
    Master,
}

impl Tier {
    pub fn for_score(score: u32) -> Self {
        match score {
            0..10 => Tier::Easy,
            10..20 => Tier::Normal,
            20..30 => Tier::Hard,
            30..50 => Tier::Expert,
            _ => Tier::Master,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Normal => "Normal",
            Tier::Hard => "Hard",
            Tier::Expert => "Expert",
            Tier::Master => "Master",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Tier::Easy => Color::srgb(0.27, 1.0, 0.27),
            Tier::Normal => Color::srgb(1.0, 1.0, 0.27),
            Tier::Hard => Color::srgb(1.0, 0.53, 0.27),
            Tier::Expert => Color::srgb(1.0, 0.27, 0.27),
            Tier::Master => Color::srgb(1.0, 0.0, 1.0),
        }
    }
}

/// Medal shown on the game-over panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Bronze,
    Silver,
    Platinum,
    Gold,
}

impl Medal {
    /// Scores under 10 earn nothing.
    pub fn for_score(score: u32) -> Option<Self> {
        match score {
            0..10 => None,
            10..20 => Some(Medal::Bronze),
            20..30 => Some(Medal::Silver),
            30..40 => Some(Medal::Platinum),
            _ => Some(Medal::Gold),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Medal::Bronze => "BRONZE",
            Medal::Silver => "SILVER",
            Medal::Platinum => "PLATINUM",
            Medal::Gold => "GOLD",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Medal::Bronze => Color::srgb(0.80, 0.50, 0.20),
            Medal::Silver => Color::srgb(0.75, 0.75, 0.75),
            Medal::Platinum => Color::srgb(0.90, 0.89, 0.89),
            Medal::Gold => Color::srgb(1.0, 0.84, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_matches_the_base_config() {
        let config = GameConfig::default();
        let settings = DifficultySettings::for_score(0, &config);
        assert_eq!(settings.pipe_speed, config.pipe_speed);
        assert_eq!(settings.pipe_gap, config.pipe_gap);
        assert_eq!(settings.spawn_interval, config.spawn_interval);
        assert_eq!(settings.gravity, config.gravity);
    }

    #[test]
    fn each_level_tightens_every_knob() {
        let config = GameConfig::default();
        let settings = DifficultySettings::for_score(30, &config);
        assert!((settings.pipe_speed - 3.1).abs() < 1e-5);
        assert_eq!(settings.pipe_gap, 165.0);
        assert_eq!(settings.spawn_interval, Duration::from_millis(1700));
        assert!((settings.gravity - 0.33).abs() < 1e-5);
    }

    #[test]
    fn settings_are_monotonic_in_score() {
        let config = GameConfig::default();
        let mut previous = DifficultySettings::for_score(0, &config);
        for score in (10..500).step_by(10) {
            let current = DifficultySettings::for_score(score, &config);
            assert!(current.pipe_speed >= previous.pipe_speed);
            assert!(current.pipe_gap <= previous.pipe_gap);
            assert!(current.spawn_interval <= previous.spawn_interval);
            assert!(current.gravity >= previous.gravity);
            previous = current;
        }
    }

    #[test]
    fn caps_hold_at_absurd_scores() {
        let config = GameConfig::default();
        let settings = DifficultySettings::for_score(10_000, &config);
        assert_eq!(settings.pipe_speed, MAX_PIPE_SPEED);
        assert_eq!(settings.pipe_gap, MIN_PIPE_GAP);
        assert_eq!(
            settings.spawn_interval,
            Duration::from_millis(MIN_SPAWN_INTERVAL_MS)
        );
        assert_eq!(settings.gravity, MAX_GRAVITY);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(Tier::for_score(0), Tier::Easy);
        assert_eq!(Tier::for_score(9), Tier::Easy);
        assert_eq!(Tier::for_score(10), Tier::Normal);
        assert_eq!(Tier::for_score(20), Tier::Hard);
        assert_eq!(Tier::for_score(30), Tier::Expert);
        assert_eq!(Tier::for_score(50), Tier::Master);
    }

    #[test]
    fn medal_boundaries() {
        assert_eq!(Medal::for_score(9), None);
        assert_eq!(Medal::for_score(10), Some(Medal::Bronze));
        assert_eq!(Medal::for_score(20), Some(Medal::Silver));
        assert_eq!(Medal::for_score(30), Some(Medal::Platinum));
        assert_eq!(Medal::for_score(40), Some(Medal::Gold));
        assert_eq!(Medal::for_score(400), Some(Medal::Gold));
    }
}
