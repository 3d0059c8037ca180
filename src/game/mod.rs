//! The main game module for the flappy arcade loop.
//!
//! This module contains all the gameplay logic including:
//! - Bird physics (gravity, flap impulse, clamping)
//! - Pipe spawning, movement, and recycling
//! - Collision detection with a forgiveness buffer
//! - Score, difficulty scaling, and the run phase machine
//! - Power-ups, achievements, persistence, and juice

mod achievements;
mod background;
mod bird;
mod collision;
pub mod config;
mod debug;
pub mod difficulty;
pub mod highscore;
pub mod phase;
mod pipes;
mod polish;
mod powerups;
pub mod score;
mod snapshot;

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use crate::{PausableSystems, asset_tracking::LoadResource, audio::music, screens::Screen};

use self::phase::{GamePhase, phase_unchanged};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        config::plugin,
        phase::plugin,
        bird::plugin,
        pipes::plugin,
        collision::plugin,
        powerups::plugin,
        score::plugin,
        highscore::plugin,
        achievements::plugin,
        background::plugin,
        polish::plugin,
        snapshot::plugin,
        debug::plugin,
    ));

    app.init_resource::<GameRng>();

    app.register_type::<GameplayAssets>();
    app.load_resource::<GameplayAssets>();

    // One simulation tick: physics, then collision against the pre-spawn
    // pipe set, then the rest of the world. The collective condition is
    // evaluated once, before `Physics`, so it cannot see a `GameOver`
    // queued by `Collision` this tick; it only keeps extra ticks in the
    // same frame from re-running a finished run before the transition
    // applies. The world stage carries its own `phase_unchanged`,
    // evaluated after `Collision`, so nothing spawns, moves, or scores on
    // the tick that ends the run.
    app.configure_sets(
        FixedUpdate,
        (SimSet::Physics, SimSet::Collision, SimSet::World)
            .chain()
            .in_set(PausableSystems)
            .run_if(in_state(GamePhase::Playing).and(phase_unchanged)),
    );
    app.configure_sets(FixedUpdate, SimSet::World.run_if(phase_unchanged));
    app.configure_sets(FixedUpdate, SimSet::Readback.after(SimSet::World));

    app.add_systems(OnEnter(Screen::Gameplay), start_music);
}

/// Stages of one fixed simulation tick, in run order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Bird physics.
    Physics,
    /// Collision tests against last tick's pipes.
    Collision,
    /// Spawning, movement, scoring, pickups.
    World,
    /// Snapshot rebuild for outside consumers.
    Readback,
}

/// The random source for gameplay rolls (gap placement, power-up drops).
/// It lives in one injectable resource so tests can run the same logic on a
/// seeded generator.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

/// Sound and music handles used during gameplay.
#[derive(Resource, Asset, Clone, Reflect)]
pub struct GameplayAssets {
    #[dependency]
    pub flap: Handle<AudioSource>,
    #[dependency]
    pub score: Handle<AudioSource>,
    #[dependency]
    pub hit: Handle<AudioSource>,
    #[dependency]
    pub powerup: Handle<AudioSource>,
    #[dependency]
    pub swoosh: Handle<AudioSource>,
    #[dependency]
    pub music: Handle<AudioSource>,
}

impl FromWorld for GameplayAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self {
            flap: assets.load("audio/sound_effects/flap.ogg"),
            score: assets.load("audio/sound_effects/score.ogg"),
            hit: assets.load("audio/sound_effects/hit.ogg"),
            powerup: assets.load("audio/sound_effects/powerup.ogg"),
            swoosh: assets.load("audio/sound_effects/swoosh.ogg"),
            music: assets.load("audio/music/daydrift.ogg"),
        }
    }
}

/// System to spawn the game root when entering gameplay.
/// Called from `screens/gameplay.rs` on `OnEnter(Screen::Gameplay)`.
pub fn spawn_game(mut commands: Commands) {
    commands.spawn((
        Name::new("Game"),
        Transform::default(),
        Visibility::default(),
        DespawnOnExit(Screen::Gameplay),
    ));

    info!("Game spawned - playfield ready!");
}

fn start_music(mut commands: Commands, assets: Option<Res<GameplayAssets>>) {
    let Some(assets) = assets else {
        return;
    };
    commands.spawn((
        Name::new("Gameplay Music"),
        music(assets.music.clone()),
        DespawnOnExit(Screen::Gameplay),
    ));
}
