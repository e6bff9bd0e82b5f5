//! Embeddable finite state machine for actors.
//!
//! Every actor with modes (player, head, worm, door) owns one [`StateMachine`] next to its
//! own component on the same entity. The machine holds:
//! - a registry of named states, each a map `event -> handler` plus an optional entry hook,
//! - exactly one current state once [`StateMachine::set_state`] has been called,
//! - synchronous state-change listeners and a transition log drained by [`ActorPlugin`].
//!
//! # Contract
//! ```text
//!   set_state(S)   unknown S            -> Err(UnknownState), machine untouched
//!                  known S (even == cur) -> previous = cur, cur = S,
//!                                           entry hook(prev), listeners(prev, S)
//!   handle(E)      no current state     -> Err(NotInitialized)
//!                  E absent in cur      -> Ok(NotHandled), nothing runs
//!                  E present            -> handler(actor, machine, ctx)
//! ```
//!
//! Handlers never get an implicit receiver. They are plain `fn` pointers that receive the
//! actor, the machine (to request transitions) and a read-only per-frame context.
//!
//! Re-entering the current state is a real transition: the entry hook runs again. Actors use
//! this to restart a clip or reset a counter.
//!
//! There is no exit hook. Cleanup belongs in the entering state's hook or at the call site.

use std::fmt::{self, Debug};
use std::hash::Hash;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use thiserror::Error;

mod adapter;

pub use adapter::{ActorPlugin, StateChanged, attach, publish_state_changes};

/// An actor that can be driven by a [`StateMachine`].
pub trait Actor: Sized + Send + Sync + 'static {
    /// State key, usually a fieldless enum.
    type State: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// Event key, usually a fieldless enum.
    type Event: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// Read-only view of the world (and any event arguments) handed to handlers.
    type Context;

    /// Event forwarded once per frame by the actor's driver.
    const UPDATE: Self::Event;
    /// Short label used in logs.
    const NAME: &'static str;
}

/// Result of dispatching an event.
///
/// `Handled` and `Rejected` come from handlers; `NotHandled` is produced by the machine when
/// the current state declares no handler for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and the command took effect.
    Handled,
    /// The current state does not care about this event.
    NotHandled,
    /// The handler ran but its precondition failed; nothing changed.
    Rejected,
}

impl Outcome {
    #[inline]
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Wiring mistakes. These are bugs in actor setup, never gameplay conditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("{actor}: unknown state `{state}`")]
    UnknownState { actor: &'static str, state: String },
    #[error("{actor}: event `{event}` dispatched before an initial state was set")]
    NotInitialized { actor: &'static str, event: String },
}

pub type FsmResult<T> = Result<T, FsmError>;

pub type Handler<A> =
    fn(&mut A, &mut StateMachine<A>, &<A as Actor>::Context) -> FsmResult<Outcome>;
pub type EnterHook<A> = fn(&mut A, Option<<A as Actor>::State>);
pub type Listener<A> = fn(&mut A, Option<<A as Actor>::State>, <A as Actor>::State);

/// One state: its event handlers and entry hook.
pub struct StateDef<A: Actor> {
    handlers: HashMap<A::Event, Handler<A>>,
    on_enter: Option<EnterHook<A>>,
}

impl<A: Actor> Default for StateDef<A> {
    fn default() -> Self {
        Self {
            handlers: HashMap::default(),
            on_enter: None,
        }
    }
}

impl<A: Actor> StateDef<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, event: A::Event, handler: Handler<A>) -> Self {
        self.handlers.insert(event, handler);
        self
    }

    pub fn on_enter(mut self, hook: EnterHook<A>) -> Self {
        self.on_enter = Some(hook);
        self
    }
}

/// Name -> state mapping installed with [`StateMachine::register_states`].
pub struct StateRegistry<A: Actor> {
    states: HashMap<A::State, StateDef<A>>,
}

impl<A: Actor> Default for StateRegistry<A> {
    fn default() -> Self {
        Self {
            states: HashMap::default(),
        }
    }
}

impl<A: Actor> StateRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, key: A::State, def: StateDef<A>) -> Self {
        self.states.insert(key, def);
        self
    }
}

/// One recorded `set_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: Option<S>,
    pub to: S,
}

#[derive(Component)]
pub struct StateMachine<A: Actor> {
    states: HashMap<A::State, StateDef<A>>,
    current: Option<A::State>,
    previous: Option<A::State>,
    listeners: Vec<Listener<A>>,
    log: Vec<Transition<A::State>>,
}

impl<A: Actor> Default for StateMachine<A> {
    fn default() -> Self {
        Self {
            states: HashMap::default(),
            current: None,
            previous: None,
            listeners: Vec::new(),
            log: Vec::new(),
        }
    }
}

impl<A: Actor> Debug for StateMachine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("actor", &A::NAME)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("states", &self.states.len())
            .finish()
    }
}

impl<A: Actor> StateMachine<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: StateRegistry<A>) -> Self {
        let mut machine = Self::new();
        machine.register_states(registry);
        machine
    }

    /// Builder form of [`Self::on_change`].
    pub fn with_listener(mut self, listener: Listener<A>) -> Self {
        self.on_change(listener);
        self
    }

    /// Replace the whole state mapping. The current state key is kept as-is.
    pub fn register_states(&mut self, registry: StateRegistry<A>) {
        self.states = registry.states;
    }

    /// Register a listener called after every successful `set_state`, in registration order.
    pub fn on_change(&mut self, listener: Listener<A>) {
        self.listeners.push(listener);
    }

    /// Enter `next`, running its entry hook and the listeners.
    ///
    /// Entering the state that is already current is not a no-op.
    pub fn set_state(&mut self, actor: &mut A, next: A::State) -> FsmResult<()> {
        let Some(def) = self.states.get(&next) else {
            return Err(FsmError::UnknownState {
                actor: A::NAME,
                state: format!("{next:?}"),
            });
        };
        let on_enter = def.on_enter;

        let from = self.current;
        self.previous = from;
        self.current = Some(next);

        if let Some(hook) = on_enter {
            hook(actor, from);
        }
        for listener in &self.listeners {
            listener(actor, from, next);
        }

        self.log.push(Transition { from, to: next });
        Ok(())
    }

    /// Dispatch `event` to the current state's handler.
    pub fn handle(
        &mut self,
        actor: &mut A,
        event: A::Event,
        ctx: &A::Context,
    ) -> FsmResult<Outcome> {
        let Some(current) = self.current else {
            return Err(FsmError::NotInitialized {
                actor: A::NAME,
                event: format!("{event:?}"),
            });
        };

        let handler = self
            .states
            .get(&current)
            .and_then(|def| def.handlers.get(&event))
            .copied();

        match handler {
            Some(handler) => handler(actor, self, ctx),
            None => Ok(Outcome::NotHandled),
        }
    }

    /// Forward the per-frame [`Actor::UPDATE`] event.
    #[inline]
    pub fn update(&mut self, actor: &mut A, ctx: &A::Context) -> FsmResult<Outcome> {
        self.handle(actor, A::UPDATE, ctx)
    }

    pub fn current_state(&self) -> Option<A::State> {
        self.current
    }

    pub fn previous_state(&self) -> Option<A::State> {
        self.previous
    }

    #[inline]
    pub fn is_in(&self, state: A::State) -> bool {
        self.current == Some(state)
    }

    pub fn has_state(&self, state: A::State) -> bool {
        self.states.contains_key(&state)
    }

    pub fn has_pending_transitions(&self) -> bool {
        !self.log.is_empty()
    }

    /// Take the transitions recorded since the last drain, oldest first.
    pub fn drain_transitions(&mut self) -> impl Iterator<Item = Transition<A::State>> + '_ {
        self.log.drain(..)
    }
}
