use bevy::prelude::*;

use super::{Body, BodySense};

#[test]
fn absorb_classifies_floor_and_walls() {
    let mut s = BodySense::default();
    s.absorb(Vec2::NEG_Y);
    assert!(s.on_floor && !s.on_wall());

    let mut s = BodySense::default();
    s.absorb(Vec2::NEG_X);
    assert!(s.blocked_left && !s.blocked_right && !s.on_floor);

    let mut s = BodySense::default();
    s.absorb(Vec2::X);
    assert!(s.blocked_right);

    // A ceiling or a shallow slope counts as neither.
    let mut s = BodySense::default();
    s.absorb(Vec2::Y);
    s.absorb(Vec2::new(0.6, -0.6).normalize() * 0.9);
    assert_eq!(s, BodySense::default());
}

#[test]
fn integrate_accelerates_and_clamps() {
    let mut b = Body::new(0.0, Vec2::new(100.0, 1000.0));
    b.acceleration_x = 400.0;
    b.integrate(0.1);
    assert_eq!(b.velocity.x, 40.0);

    for _ in 0..10 {
        b.integrate(0.1);
    }
    assert_eq!(b.velocity.x, 100.0);
}

#[test]
fn integrate_drag_stops_without_overshoot() {
    let mut b = Body::new(100.0, Vec2::splat(1000.0));
    b.velocity.x = -25.0;
    b.integrate(0.1);
    assert_eq!(b.velocity.x, -15.0);
    b.integrate(0.5);
    assert_eq!(b.velocity.x, 0.0);
}
