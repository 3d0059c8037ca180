//! The run phase inside the gameplay screen.
//!
//! The title screen plays the role of the menu; once the player is in
//! gameplay, a run is either live or over. A single "activate" input
//! (Space, Up, left click, or a tap) drives everything: it flaps during a
//! run and restarts after a crash. Restarting re-enters [`GamePhase::Playing`],
//! so every subsystem's reset hook runs again.

use bevy::prelude::*;

use super::{bird::Bird, config::GameConfig};
use crate::{AppSystems, menus::Menu, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.add_sub_state::<GamePhase>();

    app.add_message::<RunStarted>();
    app.add_message::<RunEnded>();
    app.add_message::<Flapped>();

    app.add_systems(OnEnter(GamePhase::Playing), announce_run_start);
    app.add_systems(OnEnter(GamePhase::GameOver), open_game_over_menu);

    app.add_systems(
        Update,
        handle_activate
            .in_set(AppSystems::RecordInput)
            .run_if(
                in_state(Screen::Gameplay)
                    .and(in_state(Menu::None).or(in_state(Menu::GameOver))),
            ),
    );
}

/// Whether the current run is live or has ended. Only exists while the
/// gameplay screen is active.
#[derive(SubStates, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[source(Screen = Screen::Gameplay)]
pub enum GamePhase {
    #[default]
    Playing,
    GameOver,
}

/// Message sent when a new run begins (first entry and every restart).
#[derive(Message, Debug, Clone)]
pub struct RunStarted;

/// Message sent on the tick the run ends.
#[derive(Message, Debug, Clone)]
pub struct RunEnded;

/// Message sent when the player flaps.
#[derive(Message, Debug, Clone)]
pub struct Flapped;

/// Run condition: no phase change is queued for this tick. The simulation
/// stops mutating the world on the tick that ended the run.
pub fn phase_unchanged(next: Option<Res<NextState<GamePhase>>>) -> bool {
    match next.as_deref() {
        Some(next) => matches!(next, NextState::Unchanged),
        None => true,
    }
}

fn announce_run_start(mut run_started: MessageWriter<RunStarted>) {
    run_started.write(RunStarted);
    info!("Run started");
}

fn open_game_over_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::GameOver);
}

/// Apply the activate input according to the current phase.
fn handle_activate(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    config: Res<GameConfig>,
    phase: Res<State<GamePhase>>,
    mut next_phase: ResMut<NextState<GamePhase>>,
    mut next_menu: ResMut<NextState<Menu>>,
    mut bird: Single<&mut Bird>,
    mut flapped: MessageWriter<Flapped>,
) {
    let pressed = keyboard.just_pressed(KeyCode::Space)
        || keyboard.just_pressed(KeyCode::ArrowUp)
        || mouse.just_pressed(MouseButton::Left)
        || touches.any_just_pressed();
    if !pressed {
        return;
    }

    match phase.get() {
        GamePhase::Playing => {
            // A flap replaces the velocity outright, so inputs coalesced
            // into one frame cannot stack.
            let next = bird.flap(config.jump_strength);
            **bird = next;
            flapped.write(Flapped);
        }
        GamePhase::GameOver => {
            // Full reset. Doubled activations coalesce in `NextState`.
            next_phase.set(GamePhase::Playing);
            next_menu.set(Menu::None);
        }
    }
}
