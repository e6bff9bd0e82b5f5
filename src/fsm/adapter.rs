//! Actor integration: attach a machine to an actor entity and publish its mode changes.
//!
//! The actor component and its `StateMachine` live side by side on one entity, so a driver
//! system can borrow both mutably from a single query:
//!
//! ```text
//!   Query<(&mut Worm, &mut StateMachine<Worm>)>
//!     actor.update()      -> machine.update(&mut actor, &ctx)
//!     actor.open()        -> machine.handle(&mut actor, Open, &ctx)   (returns Outcome)
//! ```
//!
//! Listeners registered on the machine run synchronously inside `set_state`. Everything else
//! in the game learns about transitions through `StateChanged<A>` messages, published once
//! per frame in `PostUpdate`.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use bevy::prelude::*;

use super::{Actor, FsmResult, StateMachine};

/// Construct the machine for `actor`, enter `initial`, and return the pair ready to be
/// spawned as components of one entity.
pub fn attach<A: Actor>(
    mut actor: A,
    mut machine: StateMachine<A>,
    initial: A::State,
) -> FsmResult<(A, StateMachine<A>)> {
    machine.set_state(&mut actor, initial)?;
    Ok((actor, machine))
}

/// A transition made by the machine on `entity`.
#[derive(Message)]
pub struct StateChanged<A: Actor> {
    pub entity: Entity,
    pub from: Option<A::State>,
    pub to: A::State,
}

impl<A: Actor> Clone for StateChanged<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Actor> Copy for StateChanged<A> {}

impl<A: Actor> Debug for StateChanged<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChanged")
            .field("actor", &A::NAME)
            .field("entity", &self.entity)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Registers `StateChanged<A>` and the system that publishes it.
pub struct ActorPlugin<A>(PhantomData<fn() -> A>);

impl<A> Default for ActorPlugin<A> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<A: Actor> Plugin for ActorPlugin<A> {
    fn build(&self, app: &mut App) {
        app.add_message::<StateChanged<A>>()
            .add_systems(PostUpdate, publish_state_changes::<A>);
    }
}

/// Drain each machine's transition log into `StateChanged<A>` messages.
pub fn publish_state_changes<A: Actor>(
    mut q: Query<(Entity, &mut StateMachine<A>)>,
    mut writer: MessageWriter<StateChanged<A>>,
) {
    for (entity, mut machine) in &mut q {
        // Avoid tripping change detection on idle machines.
        if !machine.has_pending_transitions() {
            continue;
        }

        for t in machine.drain_transitions() {
            debug!("{} {entity:?}: {:?} -> {:?}", A::NAME, t.from, t.to);
            writer.write(StateChanged {
                entity,
                from: t.from,
                to: t.to,
            });
        }
    }
}
