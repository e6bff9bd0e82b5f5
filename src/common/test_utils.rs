//! Test helpers.
//!
//! Systems are driven one at a time on a bare `World` through `RunSystemOnce`, so tests do
//! not need a schedule, a window or the physics pipeline. Deferred commands are flushed
//! after each run so assertions see spawned/inserted components.

use std::time::Duration;

use bevy::ecs::error::BevyError;
use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::ecs::world::CommandQueue;
use bevy::prelude::*;

use super::tunables::Tunables;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// A world with default `Tunables` and a generic `Time` that has advanced by `dt` once.
pub fn world_with_time(dt: Duration) -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    let mut time = Time::<()>::default();
    time.advance_by(dt);
    world.insert_resource(time);
    world
}

/// Advance the generic `Time` resource by `dt`.
pub fn advance_time(world: &mut World, dt: Duration) {
    world.resource_mut::<Time>().advance_by(dt);
}

/// Make sure the message buffer for `M` exists so readers/writers can run.
pub fn ensure_messages<M: Message>(world: &mut World) {
    if world.get_resource::<Messages<M>>().is_none() {
        world.init_resource::<Messages<M>>();
    }
}

/// Drain every buffered `M` without going through a reader.
pub fn drain_messages<M: Message>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}

/// Run a fallible system once and fail the test if it returned an error.
pub fn run_fallible_once<T, Marker>(world: &mut World, system: T)
where
    T: IntoSystem<(), Result<(), BevyError>, Marker>,
{
    if let Err(err) = run_system_once(world, system) {
        panic!("system returned an error: {err}");
    }
}

/// Run `f` with a `Commands` bound to `world`, then apply the queued commands.
pub fn with_commands<T>(world: &mut World, f: impl FnOnce(&mut Commands) -> T) -> T {
    let mut queue = CommandQueue::default();
    let out = {
        let mut commands = Commands::new(&mut queue, world);
        f(&mut commands)
    };
    queue.apply(world);
    out
}
