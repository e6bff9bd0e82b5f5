use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn keeps_customised_tunables() {
    let mut app = App::new();
    app.insert_resource(Tunables {
        puke_pool_capacity: 3,
        ..default()
    });
    core::plugin(&mut app);
    assert_eq!(app.world().resource::<Tunables>().puke_pool_capacity, 3);
}

#[test]
fn restart_key_returns_to_the_level() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    core::plugin(&mut app);

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::GameOver);
    app.update();
    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::GameOver);

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::KeyR);
    app.update();
    app.update();
    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::InGame);
}
