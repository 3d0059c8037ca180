//! Power-ups: timed pickups that bend the rules for a few seconds.
//!
//! A pipe has a one-in-five chance of bringing a pickup with it, floating in
//! line with its gap. Touching one starts (or restarts) that effect's
//! countdown. Effects reset along with the rest of the run.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use super::{
    GameRng, SimSet,
    bird::Bird,
    config::{GameConfig, to_world},
    difficulty::DifficultySettings,
    phase::GamePhase,
    pipes::PipeSpawned,
    score::GameScore,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<PowerUp>();
    app.init_resource::<ActiveEffects>();

    app.add_message::<PowerUpCollected>();

    app.add_systems(OnEnter(GamePhase::Playing), reset_powerups);
    app.add_systems(
        FixedUpdate,
        (
            spawn_powerups,
            move_powerups,
            collect_powerups,
            tick_effects,
        )
            .chain()
            .in_set(SimSet::World),
    );
    app.add_systems(
        Update,
        sync_powerup_transforms.run_if(in_state(Screen::Gameplay)),
    );
}

/// How far past its pipe a pickup floats.
const SPAWN_LEAD: f32 = 80.0;

/// Pull radius and per-tick pull strength of the magnet effect.
const MAGNET_RADIUS: f32 = 120.0;
const MAGNET_PULL: f32 = 3.0;

/// Slow motion halves the world's pace.
const SLOWMO_FACTOR: f32 = 0.5;

/// Size reduction shrinks the bird's box to 60%.
const TINY_FACTOR: f32 = 0.6;

/// The four pickup kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PowerUpKind {
    /// Pipes can't end the run.
    Shield,
    /// Pipes move and spawn at half pace.
    SlowMo,
    /// The bird's hitbox shrinks.
    Tiny,
    /// Nearby pickups drift toward the bird.
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::SlowMo,
        PowerUpKind::Tiny,
        PowerUpKind::Magnet,
    ];

    pub fn duration(&self) -> Duration {
        match self {
            PowerUpKind::Shield => Duration::from_secs(5),
            PowerUpKind::SlowMo => Duration::from_secs(4),
            PowerUpKind::Tiny => Duration::from_secs(6),
            PowerUpKind::Magnet => Duration::from_secs(8),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::SlowMo => "Slow Motion",
            PowerUpKind::Tiny => "Tiny Bird",
            PowerUpKind::Magnet => "Magnet",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PowerUpKind::Shield => Color::srgb(0.0, 1.0, 1.0),
            PowerUpKind::SlowMo => Color::srgb(1.0, 0.0, 1.0),
            PowerUpKind::Tiny => Color::srgb(1.0, 1.0, 0.0),
            PowerUpKind::Magnet => Color::srgb(1.0, 0.53, 0.0),
        }
    }

    pub fn roll(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A pickup drifting along with the pipes. Position is the top-left corner
/// of its box in playfield coordinates.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub position: Vec2,
    pub size: f32,
    /// One-way latch: a pickup is consumed at most once.
    pub collected: bool,
}

/// Message sent when the bird picks something up.
#[derive(Message, Debug, Clone)]
pub struct PowerUpCollected {
    pub kind: PowerUpKind,
}

/// The effects currently running, with their remaining time.
#[derive(Resource, Debug, Default)]
pub struct ActiveEffects {
    running: Vec<(PowerUpKind, Duration)>,
}

impl ActiveEffects {
    pub fn has(&self, kind: PowerUpKind) -> bool {
        self.running.iter().any(|(k, _)| *k == kind)
    }

    /// Start an effect, or restart its countdown if it is already running.
    pub fn activate(&mut self, kind: PowerUpKind) {
        let duration = kind.duration();
        if let Some(entry) = self.running.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = duration;
        } else {
            self.running.push((kind, duration));
        }
    }

    /// Count down every running effect, dropping the expired ones.
    pub fn tick(&mut self, delta: Duration) {
        for (kind, remaining) in &mut self.running {
            *remaining = remaining.saturating_sub(delta);
            if remaining.is_zero() {
                info!("{} expired", kind.label());
            }
        }
        self.running.retain(|(_, remaining)| !remaining.is_zero());
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }

    pub fn shielded(&self) -> bool {
        self.has(PowerUpKind::Shield)
    }

    /// Multiplier on the world's horizontal pace.
    pub fn speed_factor(&self) -> f32 {
        if self.has(PowerUpKind::SlowMo) {
            SLOWMO_FACTOR
        } else {
            1.0
        }
    }

    /// Stretch a timer delta by the slow-motion factor.
    pub fn scale_delta(&self, delta: Duration) -> Duration {
        delta.mul_f32(self.speed_factor())
    }

    /// Multiplier on the bird's hitbox.
    pub fn bird_scale(&self) -> f32 {
        if self.has(PowerUpKind::Tiny) {
            TINY_FACTOR
        } else {
            1.0
        }
    }

    /// Kinds currently running, for the HUD and debug overlay.
    pub fn labels(&self) -> Vec<&'static str> {
        self.running.iter().map(|(kind, _)| kind.label()).collect()
    }
}

/// Clear effects and leftover pickups for a new run.
fn reset_powerups(
    mut commands: Commands,
    mut effects: ResMut<ActiveEffects>,
    pickups: Query<Entity, With<PowerUp>>,
) {
    effects.clear();
    for entity in &pickups {
        commands.entity(entity).despawn();
    }
}

/// Roll a pickup for each freshly spawned pipe.
fn spawn_powerups(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut rng: ResMut<GameRng>,
    mut spawned: MessageReader<PipeSpawned>,
) {
    for pipe in spawned.read() {
        if !rng.0.random_bool(config.powerup_chance) {
            continue;
        }

        let kind = PowerUpKind::roll(&mut rng.0);
        let gap_center = pipe.gap_y + pipe.gap_height / 2.0;
        let position = Vec2::new(
            pipe.x + config.pipe_width + SPAWN_LEAD,
            gap_center - config.powerup_size / 2.0,
        );

        info!("{} spawned behind pipe at x={:.0}", kind.label(), pipe.x);
        commands.spawn((
            Name::new(format!("PowerUp {}", kind.label())),
            PowerUp {
                kind,
                position,
                size: config.powerup_size,
                collected: false,
            },
            Sprite::from_color(kind.color(), Vec2::splat(config.powerup_size)),
            Transform::from_translation(to_world(position).extend(1.0)),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Drift pickups left with the pipes; the magnet pulls them in.
fn move_powerups(
    mut commands: Commands,
    config: Res<GameConfig>,
    score: Res<GameScore>,
    effects: Res<ActiveEffects>,
    bird: Single<&Bird>,
    mut pickups: Query<(Entity, &mut PowerUp)>,
) {
    let settings = DifficultySettings::for_score(score.score, &config);
    let speed = settings.pipe_speed * effects.speed_factor();
    let magnet = effects.has(PowerUpKind::Magnet);
    let bird_center = bird.center();

    for (entity, mut pickup) in &mut pickups {
        pickup.position.x -= speed;

        if magnet {
            let center = pickup.position + Vec2::splat(pickup.size / 2.0);
            let offset = bird_center - center;
            if offset.length() < MAGNET_RADIUS {
                pickup.position += offset.clamp_length_max(MAGNET_PULL);
            }
        }

        if pickup.position.x + pickup.size < -config.pipe_width {
            commands.entity(entity).despawn();
        }
    }
}

/// Consume pickups the bird touches. The full (unshrunk) bird box is used;
/// pickups are meant to be easy to grab.
fn collect_powerups(
    mut commands: Commands,
    bird: Single<&Bird>,
    mut effects: ResMut<ActiveEffects>,
    mut pickups: Query<(Entity, &mut PowerUp)>,
    mut collected: MessageWriter<PowerUpCollected>,
) {
    for (entity, mut pickup) in &mut pickups {
        if pickup.collected || !overlaps_bird(&bird, &pickup) {
            continue;
        }
        pickup.collected = true;
        effects.activate(pickup.kind);
        collected.write(PowerUpCollected { kind: pickup.kind });
        info!("Collected {}", pickup.kind.label());
        commands.entity(entity).despawn();
    }
}

fn overlaps_bird(bird: &Bird, pickup: &PowerUp) -> bool {
    bird.position.x < pickup.position.x + pickup.size
        && bird.position.x + bird.size.x > pickup.position.x
        && bird.position.y < pickup.position.y + pickup.size
        && bird.position.y + bird.size.y > pickup.position.y
}

/// Count down running effects once per tick.
fn tick_effects(time: Res<Time>, mut effects: ResMut<ActiveEffects>) {
    effects.tick(time.delta());
}

fn sync_powerup_transforms(time: Res<Time>, mut pickups: Query<(&PowerUp, &mut Transform)>) {
    for (pickup, mut transform) in &mut pickups {
        let center = pickup.position + Vec2::splat(pickup.size / 2.0);
        // A light bob so pickups read as floating.
        let bob = (time.elapsed_secs() * 4.0).sin() * 5.0;
        transform.translation = (to_world(center) + Vec2::new(0.0, bob)).extend(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn activate_then_expire() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpKind::Shield);
        assert!(effects.shielded());

        effects.tick(Duration::from_secs(4));
        assert!(effects.shielded());

        effects.tick(Duration::from_secs(1));
        assert!(!effects.shielded());
    }

    #[test]
    fn reactivation_restarts_the_countdown() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpKind::SlowMo);
        effects.tick(Duration::from_secs(3));

        // Picking up a second one with a second left starts over at 4s.
        effects.activate(PowerUpKind::SlowMo);
        effects.tick(Duration::from_secs(3));
        assert!(effects.has(PowerUpKind::SlowMo));

        effects.tick(Duration::from_secs(1));
        assert!(!effects.has(PowerUpKind::SlowMo));
    }

    #[test]
    fn factors_follow_active_kinds() {
        let mut effects = ActiveEffects::default();
        assert_eq!(effects.speed_factor(), 1.0);
        assert_eq!(effects.bird_scale(), 1.0);

        effects.activate(PowerUpKind::SlowMo);
        effects.activate(PowerUpKind::Tiny);
        assert_eq!(effects.speed_factor(), SLOWMO_FACTOR);
        assert_eq!(effects.bird_scale(), TINY_FACTOR);
        assert_eq!(
            effects.scale_delta(Duration::from_millis(100)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn independent_effects_run_concurrently() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpKind::Shield);
        effects.activate(PowerUpKind::Magnet);

        effects.tick(Duration::from_secs(6));
        assert!(!effects.shielded());
        assert!(effects.has(PowerUpKind::Magnet));
    }

    #[test]
    fn roll_covers_every_kind() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let kind = PowerUpKind::roll(&mut rng);
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        assert_eq!(seen.len(), PowerUpKind::ALL.len());
    }
}
