use glam::Vec2;

use crate::pet::{Edge, PetKind, ReactionKind};

/// Which pet this entity is. Exactly one entity per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pet(pub PetKind);

/// Screen border the pet walks along. Fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeBand(pub Edge);

/// Top-left corner of the sprite in screen pixels.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Travel direction along the edge's free axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards larger x (top/bottom) or larger y (left/right).
    Increasing,
    Decreasing,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Increasing => 1.0,
            Direction::Decreasing => -1.0,
        }
    }

    pub fn random(rng: &mut fastrand::Rng) -> Self {
        if rng.bool() {
            Direction::Increasing
        } else {
            Direction::Decreasing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading(pub Direction);

/// Walking speed in pixels per tick, sampled once at spawn.
#[derive(Debug, Clone, Copy)]
pub struct Speed {
    pub base: f32,
}

/// Speed multiplier while fleeing.
pub const FLEE_SPEED_MULTIPLIER: f32 = 4.0;

impl Speed {
    /// Speed actually used for movement this tick.
    pub fn current(&self, reaction: &Reaction) -> f32 {
        match reaction {
            Reaction::Active {
                kind: ReactionKind::Flee,
                ..
            } => self.base * FLEE_SPEED_MULTIPLIER,
            _ => self.base,
        }
    }
}

/// Walk-cycle counter period in ticks.
pub const GAIT_PERIOD: u8 = 20;

/// Walk-cycle counter. Only picks a visual pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gait {
    pub frame: u8,
}

impl Gait {
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % GAIT_PERIOD;
    }

    /// True for the first half of each cycle.
    pub fn mid_stride(&self) -> bool {
        self.frame < GAIT_PERIOD / 2
    }
}

/// Reaction state machine: idle, or one reaction counting down.
///
/// `Active::remaining` is always > 0; the tick that would bring it to zero
/// returns the pet to `Idle` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reaction {
    #[default]
    Idle,
    Active { kind: ReactionKind, remaining: u32 },
}

impl Reaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Reaction::Idle)
    }

    pub fn kind(&self) -> Option<ReactionKind> {
        match *self {
            Reaction::Idle => None,
            Reaction::Active { kind, .. } => Some(kind),
        }
    }

    /// Count down one tick. Returns true if the reaction ended on this tick.
    pub fn decay(&mut self) -> bool {
        match self {
            Reaction::Idle => false,
            Reaction::Active { remaining, .. } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    *self = Reaction::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }
}
