//! A read-only view of the simulation, rebuilt after every tick.
//!
//! Consumers that want to draw or inspect the game (the debug overlay, or
//! anything external) read this instead of poking at live components. The
//! old `started`/`gameOver` flags survive only as derived accessors here.

use bevy::prelude::*;

use super::{
    SimSet, bird::Bird, highscore::HighScores, phase::GamePhase, pipes::Pipe, score::GameScore,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<FrameSnapshot>();
    app.add_systems(FixedUpdate, rebuild_snapshot.in_set(SimSet::Readback));
}

/// The coarse phase as seen from outside the gameplay screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseView {
    /// On the title screen; no run exists.
    #[default]
    Menu,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy)]
pub struct BirdView {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct PipeView {
    pub x: f32,
    pub width: f32,
    pub gap_y: f32,
    pub gap_height: f32,
    pub passed: bool,
}

/// Everything a renderer needs, frozen at the end of the last tick.
#[derive(Resource, Debug, Default, Clone)]
pub struct FrameSnapshot {
    pub bird: Option<BirdView>,
    /// Oldest-spawned first.
    pub pipes: Vec<PipeView>,
    pub score: u32,
    pub high_score: u32,
    pub phase: PhaseView,
}

impl FrameSnapshot {
    /// Derived view of the legacy `started` flag.
    pub fn started(&self) -> bool {
        self.phase != PhaseView::Menu
    }

    /// Derived view of the legacy `gameOver` flag.
    pub fn game_over(&self) -> bool {
        self.phase == PhaseView::GameOver
    }
}

fn rebuild_snapshot(
    mut snapshot: ResMut<FrameSnapshot>,
    phase: Option<Res<State<GamePhase>>>,
    bird: Query<&Bird>,
    pipes: Query<&Pipe>,
    score: Res<GameScore>,
    high_scores: Res<HighScores>,
) {
    snapshot.phase = match phase.as_deref().map(State::get) {
        None => PhaseView::Menu,
        Some(GamePhase::Playing) => PhaseView::Playing,
        Some(GamePhase::GameOver) => PhaseView::GameOver,
    };

    snapshot.bird = bird.iter().next().map(|bird| BirdView {
        position: bird.position,
        velocity: bird.velocity,
        size: bird.size,
    });

    let mut pipes: Vec<(u64, PipeView)> = pipes
        .iter()
        .map(|pipe| {
            (
                pipe.seq,
                PipeView {
                    x: pipe.x,
                    width: pipe.width,
                    gap_y: pipe.gap_y,
                    gap_height: pipe.gap_height,
                    passed: pipe.passed,
                },
            )
        })
        .collect();
    pipes.sort_by_key(|(seq, _)| *seq);
    snapshot.pipes = pipes.into_iter().map(|(_, view)| view).collect();

    snapshot.score = score.score;
    snapshot.high_score = high_scores.best();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_flags_follow_the_phase() {
        let mut snapshot = FrameSnapshot::default();
        assert!(!snapshot.started());
        assert!(!snapshot.game_over());

        snapshot.phase = PhaseView::Playing;
        assert!(snapshot.started());
        assert!(!snapshot.game_over());

        snapshot.phase = PhaseView::GameOver;
        assert!(snapshot.started());
        assert!(snapshot.game_over());
    }
}
