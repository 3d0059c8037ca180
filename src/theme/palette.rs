use bevy::prelude::*;

/// Off-white text for labels on dark overlays
pub const LABEL_TEXT: Color = Color::srgb(0.92, 0.92, 0.88);

/// Gold text for headers, like the title logo
pub const HEADER_TEXT: Color = Color::srgb(1.0, 0.84, 0.0);

/// Dark text for buttons
pub const BUTTON_TEXT: Color = Color::srgb(0.1, 0.1, 0.1);
/// #73bf2e, the pipe green
pub const BUTTON_BACKGROUND: Color = Color::srgb(0.451, 0.749, 0.180);
/// #8fd146
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.561, 0.820, 0.275);
/// #5a9623
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.353, 0.588, 0.137);
