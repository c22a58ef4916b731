use glam::Vec2;

use crate::ecs::components::{Pet, Position};
use crate::pet::{PetKind, SPRITE_SIZE};

/// Turns polled cursor positions into pointer-enter events.
///
/// The overlay window is click-through, so there are no per-sprite enter
/// events to listen to; instead the cursor is polled once per frame and
/// compared against the previous poll.
#[derive(Debug, Default)]
pub struct HoverTracker {
    hovered: Option<PetKind>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pet currently under the cursor, as of the last poll.
    pub fn hovered(&self) -> Option<PetKind> {
        self.hovered
    }

    /// Record a new cursor position. Returns the pet the cursor just entered.
    pub fn update(&mut self, world: &hecs::World, cursor: Vec2) -> Option<PetKind> {
        let under = pet_at(world, cursor);
        let entered = match under {
            Some(kind) if self.hovered != Some(kind) => Some(kind),
            _ => None,
        };
        self.hovered = under;
        entered
    }

    /// Forget the hovered pet (e.g. after a respawn).
    pub fn reset(&mut self) {
        self.hovered = None;
    }
}

/// First pet whose sprite contains `point`.
pub fn pet_at(world: &hecs::World, point: Vec2) -> Option<PetKind> {
    world
        .query::<(&Pet, &Position)>()
        .iter()
        .find(|(_, (_, pos))| {
            let min = pos.0;
            let max = pos.0 + Vec2::splat(SPRITE_SIZE);
            point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
        })
        .map(|(_, (pet, _))| pet.0)
}
