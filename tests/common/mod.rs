//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `duti_drop::game::configure_headless` to install gameplay plugins.
//! - virtual time advances a fixed 16 ms per `update`, so fixed-step systems run
//!   deterministically.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use duti_drop::common::tunables::Tunables;

pub const FRAME: Duration = Duration::from_millis(16);

pub fn app_headless() -> App {
    app_headless_with(Tunables::default())
}

/// Headless app with customised tunables, already inside the level.
pub fn app_headless_with(tunables: Tunables) -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.insert_resource(tunables);

    duti_drop::game::configure_headless(&mut app);

    // `App::run` normally finalizes plugins; driving `update` by hand needs it explicitly.
    app.finish();
    app.cleanup();

    // First update runs OnEnter(InGame).
    app.update();
    app
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// The single entity carrying `C`.
pub fn single<C: Component>(app: &mut App) -> Entity {
    let mut q = app.world_mut().query_filtered::<Entity, With<C>>();
    q.single(app.world()).expect("exactly one entity")
}
