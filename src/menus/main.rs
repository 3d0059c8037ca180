//! The main menu (seen on the title screen).

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

use crate::{
    asset_tracking::ResourceHandles, game::highscore::HighScores, menus::Menu, screens::Screen,
    theme::widget,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::Main), spawn_main_menu);

    // The activate keys start a run straight from the title, like tapping
    // the playfield did in the original.
    app.add_systems(
        Update,
        start_game.run_if(
            in_state(Menu::Main).and(
                input_just_pressed(KeyCode::Space).or(input_just_pressed(KeyCode::ArrowUp)),
            ),
        ),
    );
}

fn start_game(resource_handles: Res<ResourceHandles>, mut next_screen: ResMut<NextState<Screen>>) {
    if resource_handles.is_all_done() {
        next_screen.set(Screen::Gameplay);
    } else {
        next_screen.set(Screen::Loading);
    }
}

fn spawn_main_menu(mut commands: Commands, high_scores: Res<HighScores>) {
    let best = high_scores.best();

    commands.spawn((
        widget::ui_root("Main Menu"),
        GlobalZIndex(2),
        DespawnOnExit(Menu::Main),
        #[cfg(not(target_family = "wasm"))]
        children![
            widget::header("FLAPPY BIRD"),
            widget::label(if best > 0 {
                format!("Best: {best}")
            } else {
                "Click or press Space to flap".to_string()
            }),
            widget::button("Play", enter_loading_or_gameplay_screen),
            widget::button("Settings", open_settings_menu),
            widget::button("Credits", open_credits_menu),
            widget::button("Exit", exit_app),
        ],
        #[cfg(target_family = "wasm")]
        children![
            widget::header("FLAPPY BIRD"),
            widget::label(if best > 0 {
                format!("Best: {best}")
            } else {
                "Click or press Space to flap".to_string()
            }),
            widget::button("Play", enter_loading_or_gameplay_screen),
            widget::button("Settings", open_settings_menu),
            widget::button("Credits", open_credits_menu),
        ],
    ));
}

fn enter_loading_or_gameplay_screen(
    _: On<Pointer<Click>>,
    resource_handles: Res<ResourceHandles>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if resource_handles.is_all_done() {
        next_screen.set(Screen::Gameplay);
    } else {
        next_screen.set(Screen::Loading);
    }
}

fn open_settings_menu(_: On<Pointer<Click>>, mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::Settings);
}

fn open_credits_menu(_: On<Pointer<Click>>, mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::Credits);
}

#[cfg(not(target_family = "wasm"))]
fn exit_app(_: On<Pointer<Click>>, mut app_exit: MessageWriter<AppExit>) {
    app_exit.write(AppExit::Success);
}
