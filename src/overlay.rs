use glam::Vec2;

use crate::config::OverlayConfig;
use crate::debug::timer::{SystemPhase, SystemTimers};
use crate::ecs::components::*;
use crate::ecs::systems;
use crate::ecs::systems::hover::HoverTracker;
use crate::pet::{self, Edge, PetKind, ReactionKind};
use crate::ticker::FixedTicker;

/// Read-only view of one pet, for the debug panel and tests.
#[derive(Debug, Clone, Copy)]
pub struct PetView {
    pub kind: PetKind,
    pub edge: Edge,
    pub pos: Vec2,
    pub direction: Direction,
    pub base_speed: f32,
    pub speed: f32,
    pub frame: u8,
    pub reaction: Reaction,
}

/// A mounted pet overlay: the pets, their clock and their RNG.
///
/// Mounting spawns the pets and starts the clock; resizes go through
/// [`PetOverlay::on_resize`]; dropping the overlay stops both. With reduced
/// motion requested nothing is mounted at all.
pub struct PetOverlay {
    world: hecs::World,
    rng: fastrand::Rng,
    ticker: FixedTicker,
    hover: HoverTracker,
    screen_w: f32,
    screen_h: f32,
    pub paused: bool,
}

impl PetOverlay {
    pub fn mount(config: &OverlayConfig, screen_w: f32, screen_h: f32) -> Option<Self> {
        if config.reduced_motion {
            log::info!("Reduced motion requested, pet overlay disabled");
            return None;
        }

        let mut overlay = Self {
            world: hecs::World::new(),
            rng: config.rng(),
            ticker: FixedTicker::default(),
            hover: HoverTracker::new(),
            screen_w,
            screen_h,
            paused: false,
        };
        overlay.respawn();
        log::info!(
            "Pet overlay mounted: {} pets on {}x{}",
            PetKind::ALL.len(),
            screen_w,
            screen_h
        );
        Some(overlay)
    }

    /// Viewport changed: throw the old pets away and roll new ones.
    pub fn on_resize(&mut self, screen_w: f32, screen_h: f32) {
        self.screen_w = screen_w;
        self.screen_h = screen_h;
        self.respawn();
        log::info!("Viewport resized to {}x{}, pets respawned", screen_w, screen_h);
    }

    pub fn respawn(&mut self) {
        pet::spawn_pets(&mut self.world, self.screen_w, self.screen_h, &mut self.rng);
        self.hover.reset();
        self.ticker.reset();
    }

    /// Feed one frame's elapsed time and run every tick that is due.
    /// Returns the number of ticks run.
    pub fn frame(&mut self, dt: f64, mut timers: Option<&mut SystemTimers>) -> u32 {
        if self.paused {
            return 0;
        }
        let due = self.ticker.advance(dt);
        for _ in 0..due {
            systems::tick_timed(
                &mut self.world,
                self.screen_w,
                self.screen_h,
                timers.as_deref_mut(),
            );
        }
        due
    }

    /// Run exactly one tick, ignoring the clock and the pause flag.
    pub fn step(&mut self) {
        systems::tick(&mut self.world, self.screen_w, self.screen_h);
    }

    /// Cursor position poll. Entering a pet triggers its reaction.
    pub fn pointer_at(
        &mut self,
        cursor: Vec2,
        mut timers: Option<&mut SystemTimers>,
    ) -> Option<ReactionKind> {
        if let Some(t) = timers.as_deref_mut() {
            t.begin();
        }
        let entered = self.hover.update(&self.world, cursor);
        let started = entered.and_then(|kind| self.poke(kind));
        if let Some(t) = timers {
            t.end(SystemPhase::Hover);
        }
        started
    }

    /// Pointer-enter on a specific pet.
    pub fn poke(&mut self, kind: PetKind) -> Option<ReactionKind> {
        systems::reaction::trigger(&mut self.world, kind, &mut self.rng)
    }

    pub fn hovered(&self) -> Option<PetKind> {
        self.hover.hovered()
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.screen_w, self.screen_h)
    }

    pub fn tick_count(&self) -> u64 {
        self.ticker.tick_count()
    }

    pub fn alpha(&self) -> f32 {
        self.ticker.alpha()
    }

    /// Current state of every pet, in spawn order.
    pub fn pets(&self) -> Vec<PetView> {
        let mut views: Vec<PetView> = self
            .world
            .query::<(&Pet, &EdgeBand, &Position, &Heading, &Speed, &Gait, &Reaction)>()
            .iter()
            .map(|(_, (pet, band, pos, heading, speed, gait, reaction))| PetView {
                kind: pet.0,
                edge: band.0,
                pos: pos.0,
                direction: heading.0,
                base_speed: speed.base,
                speed: speed.current(reaction),
                frame: gait.frame,
                reaction: *reaction,
            })
            .collect();
        views.sort_by_key(|v| PetKind::ALL.iter().position(|k| *k == v.kind));
        views
    }
}

impl Drop for PetOverlay {
    fn drop(&mut self) {
        log::info!(
            "Pet overlay unmounted after {} ticks",
            self.ticker.tick_count()
        );
    }
}
