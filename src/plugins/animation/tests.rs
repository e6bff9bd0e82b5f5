use super::{Animator, Clip};

static ONCE: Clip = Clip {
    name: "once",
    frames: &[3, 4, 5],
    fps: 10.0,
    looping: false,
};

static LOOP: Clip = Clip {
    name: "loop",
    frames: &[7, 8],
    fps: 10.0,
    looping: true,
};

#[test]
fn one_shot_clip_finishes_on_last_frame() {
    let mut a = Animator::default();
    a.restart(&ONCE);
    assert_eq!(a.frame(), 3);

    a.tick(0.1);
    a.tick(0.1);
    assert_eq!(a.frame(), 5);
    assert!(!a.is_finished());

    a.tick(0.1);
    assert!(a.is_finished());
    assert_eq!(a.frame(), 5);
    assert!(a.is_current(&ONCE));
    assert!(!a.is_playing(&ONCE));
}

#[test]
fn looping_clip_wraps() {
    let mut a = Animator::default();
    a.play(&LOOP);
    a.tick(0.25);
    assert_eq!(a.frame(), 7);
    assert!(!a.is_finished());
}

#[test]
fn play_does_not_restart_a_running_clip() {
    let mut a = Animator::default();
    a.play(&ONCE);
    a.tick(0.1);
    a.play(&ONCE);
    assert_eq!(a.clip_index(), 1);

    a.restart(&ONCE);
    assert_eq!(a.clip_index(), 0);
}

#[test]
fn stop_holds_frame_and_set_frame_overrides() {
    let mut a = Animator::default();
    a.play(&LOOP);
    a.tick(0.1);
    a.stop();
    assert_eq!(a.frame(), 8);
    assert!(a.current().is_none());

    a.set_frame(0);
    assert_eq!(a.frame(), 0);
}
