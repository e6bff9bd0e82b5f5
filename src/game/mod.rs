//! Composition root.
//!
//! ```text
//!   run()               window + renderer + gameplay + render-only plugins
//!   configure_headless  gameplay only; integration tests add MinimalPlugins themselves
//! ```

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::plugins;

pub const TITLE: &str = "Duti Drop";
pub const WINDOW_SIZE: (u32, u32) = (1280, 720);

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

pub fn configure_full(app: &mut App) {
    let (width, height) = WINDOW_SIZE;
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: TITLE.into(),
            resolution: WindowResolution::new(width, height),
            ..default()
        }),
        ..default()
    }));

    register_gameplay(app);
    plugins::register_render(app);
}

/// Gameplay without a window. Render-only plugins (Firefly, camera, HUD) are left out.
pub fn configure_headless(app: &mut App) {
    register_gameplay(app);
}

fn register_gameplay(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
