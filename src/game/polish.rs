//! Juice: screen shake, particles, floating score text, and sound cues.
//!
//! Particles live in a fixed-capacity arena with a free list, drawn as
//! gizmo circles, so bursts never allocate mid-run.

use bevy::prelude::*;
use rand::Rng;

use super::{
    GameRng, GameplayAssets,
    bird::Bird,
    config::to_world,
    phase::{Flapped, RunEnded, RunStarted},
    pipes::PipePassed,
    powerups::PowerUpCollected,
};
use crate::{PausableSystems, audio::sound_effect, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    // Screen shake
    app.init_resource::<ScreenShake>();
    app.add_systems(
        Update,
        (trigger_shake_on_crash, apply_screen_shake)
            .chain()
            .run_if(in_state(Screen::Gameplay)),
    );

    // Particles keep animating after a crash so the impact burst plays out.
    app.init_resource::<ParticlePool>();
    app.add_systems(
        FixedUpdate,
        (burst_on_events, update_particles)
            .chain()
            .in_set(PausableSystems)
            .run_if(in_state(Screen::Gameplay)),
    );
    app.add_systems(Update, draw_particles.run_if(in_state(Screen::Gameplay)));

    // Floating "+1" text
    app.add_systems(
        Update,
        (spawn_score_pops, animate_score_pops).run_if(in_state(Screen::Gameplay)),
    );

    // Sound cues
    app.add_systems(
        Update,
        play_sound_cues
            .run_if(in_state(Screen::Gameplay).and(resource_exists::<GameplayAssets>)),
    );
}

// =============================================================================
// SCREEN SHAKE
// =============================================================================

/// Resource tracking screen shake state.
#[derive(Resource, Default)]
pub struct ScreenShake {
    /// Current trauma level (0.0 to 1.0).
    pub trauma: f32,
}

/// Maximum shake offset in pixels.
const MAX_SHAKE_OFFSET: f32 = 10.0;
/// How fast trauma decays per second.
const TRAUMA_DECAY: f32 = 2.5;

/// A crash is the only thing worth shaking the screen over.
fn trigger_shake_on_crash(mut shake: ResMut<ScreenShake>, mut ended: MessageReader<RunEnded>) {
    for _ in ended.read() {
        shake.trauma = 1.0;
    }
}

/// Apply screen shake to the camera.
fn apply_screen_shake(
    time: Res<Time>,
    mut shake: ResMut<ScreenShake>,
    mut rng: ResMut<GameRng>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    if shake.trauma > 0.0 {
        // Shake amount = trauma^2 (makes it feel more natural)
        let shake_amount = shake.trauma * shake.trauma;

        let offset_x = rng.0.random_range(-1.0..1.0) * MAX_SHAKE_OFFSET * shake_amount;
        let offset_y = rng.0.random_range(-1.0..1.0) * MAX_SHAKE_OFFSET * shake_amount;

        camera_transform.translation.x = offset_x;
        camera_transform.translation.y = offset_y;

        shake.trauma = (shake.trauma - TRAUMA_DECAY * time.delta_secs()).max(0.0);
    } else {
        camera_transform.translation.x = 0.0;
        camera_transform.translation.y = 0.0;
    }
}

// =============================================================================
// PARTICLES
// =============================================================================

/// Hard cap on live particles.
const MAX_PARTICLES: usize = 100;

/// Per-tick gravity applied to particles.
const PARTICLE_GRAVITY: f32 = 0.2;

/// One slot's worth of particle. Positions are in playfield space.
#[derive(Debug, Clone, Copy)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    life: u32,
    max_life: u32,
    size: f32,
    color: Color,
}

/// Fixed-capacity particle arena. Slots are reused through a free list, so
/// acquire and release are O(1) index operations.
#[derive(Resource)]
pub struct ParticlePool {
    slots: Vec<Option<Particle>>,
    free: Vec<usize>,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self {
            slots: vec![None; MAX_PARTICLES],
            free: (0..MAX_PARTICLES).rev().collect(),
        }
    }
}

impl ParticlePool {
    /// Take a free slot for the particle. Over capacity, the burst is
    /// simply truncated.
    fn spawn(&mut self, particle: Particle) {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(particle);
        }
    }

    fn release(&mut self, index: usize) {
        self.slots[index] = None;
        self.free.push(index);
    }

    /// Number of live particles.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

/// Feathers shed on a flap.
fn flap_burst(pool: &mut ParticlePool, rng: &mut impl Rng, at: Vec2) {
    for _ in 0..5 {
        pool.spawn(Particle {
            position: at,
            velocity: Vec2::new(rng.random_range(-1.5..1.5), rng.random_range(1.0..3.0)),
            life: 30,
            max_life: 30,
            size: rng.random_range(2.0..5.0),
            color: Color::srgb(1.0, 0.88, 0.35),
        });
    }
}

/// Sparkles in a ring when a pipe is cleared.
fn score_burst(pool: &mut ParticlePool, at: Vec2) {
    for i in 0..8 {
        let angle = std::f32::consts::TAU * i as f32 / 8.0;
        pool.spawn(Particle {
            position: at,
            velocity: Vec2::from_angle(angle) * 2.0 - Vec2::new(0.0, 1.0),
            life: 50,
            max_life: 50,
            size: 3.0,
            color: Color::srgb(1.0, 0.84, 0.0),
        });
    }
}

/// Debris flung outward on a crash.
fn impact_burst(pool: &mut ParticlePool, rng: &mut impl Rng, at: Vec2) {
    for i in 0..15 {
        let angle = std::f32::consts::TAU * i as f32 / 15.0;
        let speed = rng.random_range(2.0..7.0);
        pool.spawn(Particle {
            position: at,
            velocity: Vec2::from_angle(angle) * speed,
            life: 40,
            max_life: 40,
            size: rng.random_range(2.0..6.0),
            color: Color::srgb(1.0, rng.random_range(0.2..0.7), 0.1),
        });
    }
}

/// Turn gameplay events into bursts at the bird's position.
fn burst_on_events(
    mut pool: ResMut<ParticlePool>,
    mut rng: ResMut<GameRng>,
    bird: Query<&Bird>,
    mut flapped: MessageReader<Flapped>,
    mut passed: MessageReader<PipePassed>,
    mut ended: MessageReader<RunEnded>,
) {
    let Ok(bird) = bird.single() else {
        return;
    };
    let at = bird.center();

    for _ in flapped.read() {
        flap_burst(&mut pool, &mut rng.0, at);
    }
    for _ in passed.read() {
        score_burst(&mut pool, at);
    }
    for _ in ended.read() {
        impact_burst(&mut pool, &mut rng.0, at);
    }
}

/// Advance live particles one tick and recycle the dead ones.
fn update_particles(mut pool: ResMut<ParticlePool>) {
    let mut dead = Vec::new();
    for (index, slot) in pool.slots.iter_mut().enumerate() {
        if let Some(particle) = slot {
            particle.position += particle.velocity;
            particle.velocity.y += PARTICLE_GRAVITY;
            particle.life -= 1;
            if particle.life == 0 {
                dead.push(index);
            }
        }
    }
    for index in dead {
        pool.release(index);
    }
}

/// Draw live particles as fading gizmo circles.
fn draw_particles(pool: Res<ParticlePool>, mut gizmos: Gizmos) {
    for particle in pool.slots.iter().flatten() {
        let alpha = particle.life as f32 / particle.max_life as f32;
        gizmos.circle_2d(
            to_world(particle.position),
            particle.size,
            particle.color.with_alpha(alpha),
        );
    }
}

// =============================================================================
// FLOATING SCORE TEXT
// =============================================================================

/// Component for a floating "+1".
#[derive(Component)]
struct ScorePop {
    timer: f32,
}

const SCORE_POP_DURATION: f32 = 0.8;

fn spawn_score_pops(
    mut commands: Commands,
    bird: Query<&Bird>,
    mut passed: MessageReader<PipePassed>,
) {
    let Ok(bird) = bird.single() else {
        return;
    };

    for _ in passed.read() {
        commands.spawn((
            Name::new("Score Pop"),
            ScorePop { timer: 0.0 },
            Text2d::new("+1"),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(Color::srgb(1.0, 1.0, 0.2)),
            Transform::from_translation(
                (to_world(bird.center()) + Vec2::new(24.0, 10.0)).extend(7.0),
            ),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

/// Float score pops up and fade them out.
fn animate_score_pops(
    mut commands: Commands,
    time: Res<Time>,
    mut pops: Query<(Entity, &mut ScorePop, &mut Transform, &mut TextColor)>,
) {
    for (entity, mut pop, mut transform, mut color) in &mut pops {
        pop.timer += time.delta_secs();
        let progress = (pop.timer / SCORE_POP_DURATION).min(1.0);

        transform.translation.y += 50.0 * time.delta_secs();

        let alpha = if progress > 0.7 {
            1.0 - (progress - 0.7) / 0.3
        } else {
            1.0
        };
        color.0 = Color::srgba(1.0, 1.0, 0.2, alpha);

        if progress >= 1.0 {
            commands.entity(entity).despawn();
        }
    }
}

// =============================================================================
// SOUND CUES
// =============================================================================

/// Fire-and-forget one-shots for the big gameplay moments.
fn play_sound_cues(
    mut commands: Commands,
    assets: Res<GameplayAssets>,
    mut started: MessageReader<RunStarted>,
    mut flapped: MessageReader<Flapped>,
    mut passed: MessageReader<PipePassed>,
    mut collected: MessageReader<PowerUpCollected>,
    mut ended: MessageReader<RunEnded>,
) {
    for _ in started.read() {
        commands.spawn(sound_effect(assets.swoosh.clone()));
    }
    for _ in flapped.read() {
        commands.spawn(sound_effect(assets.flap.clone()));
    }
    for _ in passed.read() {
        commands.spawn(sound_effect(assets.score.clone()));
    }
    for _ in collected.read() {
        commands.spawn(sound_effect(assets.powerup.clone()));
    }
    for _ in ended.read() {
        commands.spawn(sound_effect(assets.hit.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_particle() -> Particle {
        Particle {
            position: Vec2::ZERO,
            velocity: Vec2::new(1.0, -1.0),
            life: 2,
            max_life: 2,
            size: 3.0,
            color: Color::WHITE,
        }
    }

    fn step(pool: &mut ParticlePool) {
        let mut dead = Vec::new();
        for (index, slot) in pool.slots.iter_mut().enumerate() {
            if let Some(particle) = slot {
                particle.life -= 1;
                if particle.life == 0 {
                    dead.push(index);
                }
            }
        }
        for index in dead {
            pool.release(index);
        }
    }

    #[test]
    fn pool_spawns_up_to_capacity() {
        let mut pool = ParticlePool::default();
        for _ in 0..(MAX_PARTICLES + 50) {
            pool.spawn(test_particle());
        }
        // The overflow was dropped, not grown into.
        assert_eq!(pool.live(), MAX_PARTICLES);
        assert_eq!(pool.slots.len(), MAX_PARTICLES);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut pool = ParticlePool::default();
        for _ in 0..MAX_PARTICLES {
            pool.spawn(test_particle());
        }

        // Two steps kill every particle and return it to the free list.
        step(&mut pool);
        step(&mut pool);
        assert_eq!(pool.live(), 0);

        // The arena is usable again at full capacity.
        for _ in 0..MAX_PARTICLES {
            pool.spawn(test_particle());
        }
        assert_eq!(pool.live(), MAX_PARTICLES);
    }

    #[test]
    fn bursts_fill_slots() {
        let mut pool = ParticlePool::default();
        score_burst(&mut pool, Vec2::new(100.0, 100.0));
        assert_eq!(pool.live(), 8);
    }
}
