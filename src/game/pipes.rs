//! Pipes: the obstacle stream.
//!
//! A repeating timer spawns a pipe at the right edge with a randomly placed
//! gap, pipes march left a fixed distance per tick, fall off the active set
//! once fully off screen, and award one point each the moment their trailing
//! edge clears the bird's leading edge.

use bevy::prelude::*;
use rand::Rng;

use super::{
    GameRng, SimSet,
    bird::Bird,
    config::{GameConfig, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, to_world},
    difficulty::DifficultySettings,
    phase::GamePhase,
    powerups::ActiveEffects,
    score::GameScore,
};
use crate::screens::Screen;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Pipe>();
    app.init_resource::<PipeSpawner>();

    app.add_message::<PipeSpawned>();
    app.add_message::<PipePassed>();

    app.add_systems(OnEnter(GamePhase::Playing), reset_pipes);
    app.add_systems(
        FixedUpdate,
        (spawn_pipes, move_pipes, despawn_offscreen_pipes, award_passed_pipes)
            .chain()
            .in_set(SimSet::World),
    );
    app.add_systems(
        Update,
        sync_pipe_transforms.run_if(in_state(Screen::Gameplay)),
    );
}

/// How far past the left edge a pipe may travel before it is dropped.
const DESPAWN_MARGIN: f32 = 50.0;

/// Fill color of the pipe sprites.
const PIPE_COLOR: Color = Color::srgb(0.451, 0.749, 0.180);

/// One obstacle. `x` is the left edge in playfield coordinates; the gap is
/// the opening between the top half (ending at `gap_y`) and the bottom half
/// (starting at `gap_y + gap_height`).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Pipe {
    pub x: f32,
    pub width: f32,
    pub gap_y: f32,
    pub gap_height: f32,
    /// One-way latch: set when the pipe has been scored.
    pub passed: bool,
    /// Spawn order, for stable oldest-first iteration.
    pub seq: u64,
}

impl Pipe {
    /// True once the pipe's trailing edge has crossed the bird's leading edge.
    pub fn cleared_by(&self, bird_x: f32) -> bool {
        self.x + self.width < bird_x
    }
}

/// Message sent when a new pipe appears at the right edge.
#[derive(Message, Debug, Clone)]
pub struct PipeSpawned {
    pub x: f32,
    pub gap_y: f32,
    pub gap_height: f32,
}

/// Message sent when the bird clears a pipe. Exactly one per pipe.
#[derive(Message, Debug, Clone)]
pub struct PipePassed;

/// Spawn timing and pipe ordering for the current run.
#[derive(Resource)]
pub struct PipeSpawner {
    pub timer: Timer,
    next_seq: u64,
}

impl Default for PipeSpawner {
    fn default() -> Self {
        Self {
            timer: Timer::new(GameConfig::default().spawn_interval, TimerMode::Repeating),
            next_seq: 0,
        }
    }
}

/// Draw a gap position that keeps `gap_margin` clear of the ceiling and the
/// ground. The caller supplies the random source so tests can seed it.
pub fn random_gap_y(rng: &mut impl Rng, gap_height: f32, config: &GameConfig) -> f32 {
    let min = config.gap_margin;
    let max = PLAYFIELD_HEIGHT - config.ground_height - gap_height - config.gap_margin;
    if max <= min {
        // Degenerate tuning; pin the gap to the top margin instead of panicking.
        return min;
    }
    rng.random_range(min..max)
}

/// Clear the field and restart the spawn clock for a new run.
fn reset_pipes(
    mut commands: Commands,
    mut spawner: ResMut<PipeSpawner>,
    config: Res<GameConfig>,
    pipes: Query<Entity, With<Pipe>>,
) {
    for entity in &pipes {
        commands.entity(entity).despawn();
    }
    spawner.timer = Timer::new(config.spawn_interval, TimerMode::Repeating);
    spawner.next_seq = 0;
}

/// Spawn a pipe at the right edge when the interval elapses.
fn spawn_pipes(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    score: Res<GameScore>,
    effects: Res<ActiveEffects>,
    mut spawner: ResMut<PipeSpawner>,
    mut rng: ResMut<GameRng>,
    mut spawned: MessageWriter<PipeSpawned>,
) {
    let settings = DifficultySettings::for_score(score.score, &config);
    spawner.timer.set_duration(settings.spawn_interval);

    // Slow motion stretches the time between spawns too.
    spawner.timer.tick(effects.scale_delta(time.delta()));
    if !spawner.timer.just_finished() {
        return;
    }

    let gap_y = random_gap_y(&mut rng.0, settings.pipe_gap, &config);
    let seq = spawner.next_seq;
    spawner.next_seq += 1;

    let pipe = Pipe {
        x: PLAYFIELD_WIDTH,
        width: config.pipe_width,
        gap_y,
        gap_height: settings.pipe_gap,
        passed: false,
        seq,
    };
    spawned.write(PipeSpawned {
        x: pipe.x,
        gap_y,
        gap_height: settings.pipe_gap,
    });
    info!("Pipe {seq} spawned with gap at y={gap_y:.0}");

    // The halves are children sized once at spawn; only the parent moves.
    let floor = config.floor();
    let top_height = gap_y;
    let bottom_top = gap_y + settings.pipe_gap;
    let bottom_height = floor - bottom_top;
    let half_width = config.pipe_width / 2.0;

    commands.spawn((
        Name::new(format!("Pipe {seq}")),
        pipe,
        Transform::from_translation(
            to_world(Vec2::new(PLAYFIELD_WIDTH + half_width, 0.0))
                .with_y(0.0)
                .extend(-1.0),
        ),
        Visibility::default(),
        DespawnOnExit(Screen::Gameplay),
        children![
            (
                Name::new("Top Half"),
                Sprite::from_color(PIPE_COLOR, Vec2::new(config.pipe_width, top_height)),
                Transform::from_xyz(0.0, PLAYFIELD_HEIGHT / 2.0 - top_height / 2.0, 0.0),
            ),
            (
                Name::new("Bottom Half"),
                Sprite::from_color(PIPE_COLOR, Vec2::new(config.pipe_width, bottom_height)),
                Transform::from_xyz(
                    0.0,
                    PLAYFIELD_HEIGHT / 2.0 - bottom_top - bottom_height / 2.0,
                    0.0,
                ),
            ),
        ],
    ));
}

/// March every pipe left by the current speed.
fn move_pipes(
    config: Res<GameConfig>,
    score: Res<GameScore>,
    effects: Res<ActiveEffects>,
    mut pipes: Query<&mut Pipe>,
) {
    let settings = DifficultySettings::for_score(score.score, &config);
    let speed = settings.pipe_speed * effects.speed_factor();
    for mut pipe in &mut pipes {
        pipe.x -= speed;
    }
}

/// Drop pipes once they are fully past the left edge.
fn despawn_offscreen_pipes(mut commands: Commands, pipes: Query<(Entity, &Pipe)>) {
    for (entity, pipe) in &pipes {
        if pipe.x + pipe.width < -DESPAWN_MARGIN {
            commands.entity(entity).despawn();
        }
    }
}

/// Latch `passed` and award a point the first time a pipe clears the bird.
fn award_passed_pipes(
    bird: Single<&Bird>,
    mut pipes: Query<&mut Pipe>,
    mut passed: MessageWriter<PipePassed>,
) {
    for mut pipe in &mut pipes {
        if !pipe.passed && pipe.cleared_by(bird.position.x) {
            pipe.passed = true;
            passed.write(PipePassed);
        }
    }
}

/// Mirror the simulated x into the render transform.
fn sync_pipe_transforms(mut pipes: Query<(&Pipe, &mut Transform)>) {
    for (pipe, mut transform) in &mut pipes {
        transform.translation.x = pipe.x + pipe.width / 2.0 - PLAYFIELD_WIDTH / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn gap_respects_margins() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let gap_y = random_gap_y(&mut rng, 180.0, &config);
            assert!(gap_y >= config.gap_margin);
            assert!(
                gap_y <= PLAYFIELD_HEIGHT - config.ground_height - 180.0 - config.gap_margin
            );
        }
    }

    #[test]
    fn degenerate_margins_pin_the_gap() {
        let config = GameConfig {
            gap_margin: 200.0,
            ..GameConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(random_gap_y(&mut rng, 180.0, &config), 200.0);
    }

    #[test]
    fn seeded_rng_reproduces_the_same_gaps() {
        let config = GameConfig::default();
        let draws = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| random_gap_y(&mut rng, 180.0, &config))
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(42), draws(42));
        assert_ne!(draws(42), draws(43));
    }

    #[test]
    fn cleared_only_after_trailing_edge_passes() {
        let pipe = Pipe {
            x: 10.0,
            width: 52.0,
            gap_y: 100.0,
            gap_height: 180.0,
            passed: false,
            seq: 0,
        };
        assert!(!pipe.cleared_by(50.0));
        assert!(!pipe.cleared_by(62.0));
        assert!(pipe.cleared_by(63.0));
    }

    #[test]
    fn passed_latch_yields_one_point_per_pipe() {
        let mut pipe = Pipe {
            x: 100.0,
            width: 52.0,
            gap_y: 100.0,
            gap_height: 180.0,
            passed: false,
            seq: 0,
        };

        // Drive the pipe across the bird and count awards the way the
        // scoring pass does.
        let bird_x = 50.0;
        let mut awards = 0;
        for _ in 0..200 {
            pipe.x -= 2.5;
            if !pipe.passed && pipe.cleared_by(bird_x) {
                pipe.passed = true;
                awards += 1;
            }
        }
        assert_eq!(awards, 1);
        assert!(pipe.passed);
    }
}
