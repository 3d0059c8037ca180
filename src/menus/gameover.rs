//! The game over overlay.
//!
//! Deliberately button-free: any activate input restarts the run (handled by
//! the phase machine), so the overlay only reports the damage. Escape backs
//! out to the title screen.

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

use crate::{
    game::{
        difficulty::Medal,
        highscore::HighScores,
        score::GameScore,
    },
    menus::Menu,
    screens::Screen,
    theme::{palette::HEADER_TEXT, widget},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Menu::GameOver), spawn_gameover_overlay);
    app.add_systems(
        Update,
        quit_to_title.run_if(in_state(Menu::GameOver).and(input_just_pressed(KeyCode::Escape))),
    );
}

fn spawn_gameover_overlay(
    mut commands: Commands,
    score: Res<GameScore>,
    high_scores: Res<HighScores>,
) {
    let medal_row: (String, Color) = match Medal::for_score(score.score) {
        Some(medal) => (format!("{} MEDAL", medal.label()), medal.color()),
        None => (String::new(), Color::NONE),
    };

    commands.spawn((
        widget::ui_root("Game Over Overlay"),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        GlobalZIndex(2),
        DespawnOnExit(Menu::GameOver),
        children![
            (
                Name::new("Game Over Header"),
                Text("GAME OVER".to_string()),
                TextFont::from_font_size(48.0),
                TextColor(HEADER_TEXT),
            ),
            widget::label(format!("Score: {}", score.score)),
            widget::label(format!("Best: {}", high_scores.best())),
            (
                Name::new("New Best"),
                Text(if score.new_best { "NEW BEST!" } else { "" }.to_string()),
                TextFont::from_font_size(24.0),
                TextColor(Color::srgb(1.0, 0.84, 0.0)),
            ),
            (
                Name::new("Medal"),
                Text(medal_row.0),
                TextFont::from_font_size(24.0),
                TextColor(medal_row.1),
            ),
            widget::label("Click or press Space to retry"),
            widget::label("Esc for title"),
        ],
    ));
}

fn quit_to_title(mut next_screen: ResMut<NextState<Screen>>) {
    next_screen.set(Screen::Title);
}
