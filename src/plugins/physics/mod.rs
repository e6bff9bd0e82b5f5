//! Physics plugin: Avian setup, contact sensing, and arcade-style motor intents.
//!
//! Frame ordering inside `FixedUpdate`:
//! ```text
//!   BodySystems::Sense   contacts from the previous step -> BodySense
//!   BodySystems::Drive   actor machines read Body, write velocity / acceleration intents
//!   BodySystems::Emit    consumers of actor output (weapons fire, hits applied)
//!   FixedPostUpdate      Avian integrates gravity + velocity and resolves collisions
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodySystems {
    Sense,
    Drive,
    Emit,
}

/// Which sides of a body touched something during the last physics step.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BodySense {
    pub on_floor: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
}

impl BodySense {
    /// Threshold on the normal component for a contact to count as floor or wall.
    const AXIS: f32 = 0.7;

    /// Fold one contact normal (pointing from this body toward the other shape) in.
    pub fn absorb(&mut self, normal: Vec2) {
        if normal.y < -Self::AXIS {
            self.on_floor = true;
        }
        if normal.x < -Self::AXIS {
            self.blocked_left = true;
        }
        if normal.x > Self::AXIS {
            self.blocked_right = true;
        }
    }

    #[inline]
    pub fn on_wall(&self) -> bool {
        self.blocked_left || self.blocked_right
    }
}

/// Kinematic intents owned by an actor.
///
/// Actor handlers mutate this copy; the driver loads it from Avian before dispatch and stores
/// it back afterwards. Avian still owns gravity and collision response.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration_x: f32,
    pub drag_x: f32,
    pub max_velocity: Vec2,
    pub sense: BodySense,
}

impl Body {
    pub fn new(drag_x: f32, max_velocity: Vec2) -> Self {
        Self {
            drag_x,
            max_velocity,
            ..default()
        }
    }

    #[inline]
    pub fn on_floor(&self) -> bool {
        self.sense.on_floor
    }

    #[inline]
    pub fn blocked_left(&self) -> bool {
        self.sense.blocked_left
    }

    #[inline]
    pub fn blocked_right(&self) -> bool {
        self.sense.blocked_right
    }

    #[inline]
    pub fn on_wall(&self) -> bool {
        self.sense.on_wall()
    }

    pub fn load(&mut self, tf: &Transform, vel: &LinearVelocity, sense: &BodySense) {
        self.position = tf.translation.truncate();
        self.velocity = vel.0;
        self.sense = *sense;
    }

    pub fn store(&self, vel: &mut LinearVelocity) {
        vel.0 = self.velocity;
    }

    /// Apply this frame's horizontal acceleration, or drag when no force is applied, then
    /// clamp to `max_velocity`.
    pub fn integrate(&mut self, dt: f32) {
        if self.acceleration_x != 0.0 {
            self.velocity.x += self.acceleration_x * dt;
        } else if self.drag_x > 0.0 {
            let drag = self.drag_x * dt;
            self.velocity.x = if self.velocity.x.abs() <= drag {
                0.0
            } else {
                self.velocity.x - drag * self.velocity.x.signum()
            };
        }
        self.velocity = self.velocity.clamp(-self.max_velocity, self.max_velocity);
    }
}

pub fn plugin(app: &mut App) {
    let (ppm, gravity) = {
        let t = app.world().resource::<Tunables>();
        (t.pixels_per_meter, t.gravity)
    };
    app.add_plugins(PhysicsPlugins::default().with_length_unit(ppm));
    app.insert_resource(Gravity(Vec2::NEG_Y * gravity));

    app.configure_sets(
        FixedUpdate,
        (BodySystems::Sense, BodySystems::Drive, BodySystems::Emit).chain(),
    );
    app.add_systems(FixedUpdate, sense_contacts.in_set(BodySystems::Sense));
}

/// Rebuild every `BodySense` from the contact pairs of the last step.
fn sense_contacts(collisions: Collisions, mut q: Query<(Entity, &mut BodySense)>) {
    for (entity, mut sense) in &mut q {
        let mut next = BodySense::default();

        for pair in collisions.collisions_with(entity) {
            if !pair.is_touching() {
                continue;
            }
            // Manifold normals point from collider1 to collider2.
            let sign = if pair.collider1 == entity { 1.0 } else { -1.0 };
            for manifold in &pair.manifolds {
                next.absorb(manifold.normal * sign);
            }
        }

        sense.set_if_neq(next);
    }
}

#[cfg(test)]
mod tests;
