pub mod animation;
pub mod hover;
pub mod movement;
pub mod reaction;

use crate::debug::timer::{SystemPhase, SystemTimers};

/// Run one fixed tick: reaction countdown, movement + reflection, walk cycle.
pub fn tick(world: &mut hecs::World, screen_w: f32, screen_h: f32) {
    tick_timed(world, screen_w, screen_h, None);
}

/// Same as [`tick`], recording per-system durations when `timers` is given.
pub fn tick_timed(
    world: &mut hecs::World,
    screen_w: f32,
    screen_h: f32,
    mut timers: Option<&mut SystemTimers>,
) {
    // 1. Reactions wear off (and flee speed with them)
    if let Some(t) = timers.as_deref_mut() {
        t.begin();
    }
    reaction::decay(world);
    if let Some(t) = timers.as_deref_mut() {
        t.end(SystemPhase::Reaction);
    }

    // 2. Walk along the edge, turn at the ends
    if let Some(t) = timers.as_deref_mut() {
        t.begin();
    }
    movement::advance(world, screen_w, screen_h);
    if let Some(t) = timers.as_deref_mut() {
        t.end(SystemPhase::Movement);
    }

    // 3. Walk cycle
    if let Some(t) = timers.as_deref_mut() {
        t.begin();
    }
    animation::advance(world);
    if let Some(t) = timers {
        t.end(SystemPhase::Animation);
    }
}
