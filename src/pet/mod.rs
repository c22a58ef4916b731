pub mod reaction;

use glam::Vec2;

use crate::ecs::components::*;

pub use self::reaction::ReactionKind;

/// Sprite footprint in pixels (square).
pub const SPRITE_SIZE: f32 = 32.0;
/// Margin kept between a walking pet and the ends of its edge.
pub const PADDING: f32 = 40.0;
/// Extra margin on left/right edges to clear the sprite's height.
pub const VERTICAL_EDGE_OFFSET: f32 = 40.0;

/// The five pets. One of each is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetKind {
    Dog,
    Cat,
    Monkey,
    Lion,
    Peacock,
}

impl PetKind {
    pub const ALL: [PetKind; 5] = [
        PetKind::Dog,
        PetKind::Cat,
        PetKind::Monkey,
        PetKind::Lion,
        PetKind::Peacock,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PetKind::Dog => "Dog",
            PetKind::Cat => "Cat",
            PetKind::Monkey => "Monkey",
            PetKind::Lion => "Lion",
            PetKind::Peacock => "Peacock",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            PetKind::Dog => "\u{1F415}",
            PetKind::Cat => "\u{1F408}",
            PetKind::Monkey => "\u{1F412}",
            PetKind::Lion => "\u{1F981}",
            PetKind::Peacock => "\u{1F99A}",
        }
    }

    /// Body color, RGBA packed as u32.
    pub fn color(self) -> u32 {
        let [r, g, b] = match self {
            PetKind::Dog => [176, 120, 70],     // brown
            PetKind::Cat => [255, 165, 50],     // orange tabby
            PetKind::Monkey => [140, 95, 60],   // dark tan
            PetKind::Lion => [230, 180, 60],    // mane gold
            PetKind::Peacock => [40, 150, 160], // teal
        };
        (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | 0xFF
    }
}

/// Screen border a pet is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Edge assignment order; pets take these round-robin.
pub const EDGES: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

impl Edge {
    /// Top and bottom pets walk along x; left and right along y.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }

    /// Reflection thresholds `(near, far)` along the free axis.
    pub fn bounds(self, screen_w: f32, screen_h: f32) -> (f32, f32) {
        if self.is_horizontal() {
            (PADDING, screen_w - PADDING)
        } else {
            (
                PADDING + VERTICAL_EDGE_OFFSET,
                screen_h - PADDING - VERTICAL_EDGE_OFFSET,
            )
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }
}

/// Everything needed to put one pet into the world.
#[derive(Debug, Clone, Copy)]
pub struct PetInit {
    pub kind: PetKind,
    pub edge: Edge,
    pub pos: Vec2,
    pub direction: Direction,
    pub base_speed: f32,
}

/// Roll a fresh set of pets for the given screen size, one per kind.
pub fn roll_pets(screen_w: f32, screen_h: f32, rng: &mut fastrand::Rng) -> Vec<PetInit> {
    // Clamp the random spans so tiny screens never produce negative or NaN offsets.
    let span_x = (screen_w - 60.0).max(0.0);
    let span_y = (screen_h - 100.0).max(0.0);

    PetKind::ALL
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let edge = EDGES[i % EDGES.len()];
            let direction = Direction::random(rng);

            let pos = match edge {
                Edge::Top => Vec2::new(rng.f32() * span_x + 30.0, 10.0),
                Edge::Bottom => Vec2::new(rng.f32() * span_x + 30.0, screen_h - 50.0),
                Edge::Left => Vec2::new(10.0, rng.f32() * span_y + 50.0),
                Edge::Right => Vec2::new(screen_w - 50.0, rng.f32() * span_y + 50.0),
            };

            PetInit {
                kind,
                edge,
                pos: pos.max(Vec2::ZERO),
                direction,
                base_speed: 0.5 + rng.f32() * 0.5,
            }
        })
        .collect()
}

/// Insert one pet entity.
pub fn spawn_pet(world: &mut hecs::World, init: PetInit) -> hecs::Entity {
    world.spawn((
        Pet(init.kind),
        EdgeBand(init.edge),
        Position(init.pos),
        Heading(init.direction),
        Speed {
            base: init.base_speed,
        },
        Gait::default(),
        Reaction::Idle,
    ))
}

/// Replace every pet in the world with a freshly rolled set.
pub fn spawn_pets(world: &mut hecs::World, screen_w: f32, screen_h: f32, rng: &mut fastrand::Rng) {
    let stale: Vec<hecs::Entity> = world
        .query::<&Pet>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for entity in stale {
        let _ = world.despawn(entity);
    }

    for init in roll_pets(screen_w, screen_h, rng) {
        spawn_pet(world, init);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_pet_per_kind_round_robin_edges() {
        let mut rng = fastrand::Rng::with_seed(7);
        let pets = roll_pets(1280.0, 720.0, &mut rng);

        let kinds: Vec<PetKind> = pets.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PetKind::ALL.to_vec());

        let edges: Vec<Edge> = pets.iter().map(|p| p.edge).collect();
        assert_eq!(
            edges,
            vec![Edge::Top, Edge::Bottom, Edge::Left, Edge::Right, Edge::Top]
        );
    }

    #[test]
    fn placement_stays_inside_edge_bands() {
        let (w, h) = (800.0, 600.0);
        for seed in 0..50 {
            let mut rng = fastrand::Rng::with_seed(seed);
            for p in roll_pets(w, h, &mut rng) {
                assert!((0.5..=1.0).contains(&p.base_speed), "speed {}", p.base_speed);
                match p.edge {
                    Edge::Top => {
                        assert_eq!(p.pos.y, 10.0);
                        assert!(p.pos.x >= 30.0 && p.pos.x <= w - 30.0);
                    }
                    Edge::Bottom => {
                        assert_eq!(p.pos.y, h - 50.0);
                        assert!(p.pos.x >= 30.0 && p.pos.x <= w - 30.0);
                    }
                    Edge::Left => {
                        assert_eq!(p.pos.x, 10.0);
                        assert!(p.pos.y >= 50.0 && p.pos.y <= h - 50.0);
                    }
                    Edge::Right => {
                        assert_eq!(p.pos.x, w - 50.0);
                        assert!(p.pos.y >= 50.0 && p.pos.y <= h - 50.0);
                    }
                }
            }
        }
    }

    #[test]
    fn tiny_screen_yields_finite_non_negative_coords() {
        let mut rng = fastrand::Rng::with_seed(3);
        for p in roll_pets(20.0, 0.0, &mut rng) {
            assert!(p.pos.x.is_finite() && p.pos.y.is_finite());
            assert!(p.pos.x >= 0.0 && p.pos.y >= 0.0, "{:?}", p.pos);
        }
    }

    #[test]
    fn respawn_replaces_all_pets() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(11);

        spawn_pets(&mut world, 800.0, 600.0, &mut rng);
        let before: Vec<hecs::Entity> = world.query::<&Pet>().iter().map(|(e, _)| e).collect();
        assert_eq!(before.len(), 5);

        spawn_pets(&mut world, 1920.0, 1080.0, &mut rng);
        let after: Vec<hecs::Entity> = world.query::<&Pet>().iter().map(|(e, _)| e).collect();
        assert_eq!(after.len(), 5);
        for e in before {
            assert!(!world.contains(e));
        }
        for (_, (band, pos)) in world.query::<(&EdgeBand, &Position)>().iter() {
            if band.0 == Edge::Right {
                assert_eq!(pos.0.x, 1870.0);
            }
        }
    }

    #[test]
    fn vertical_edges_keep_extra_margin() {
        assert_eq!(Edge::Top.bounds(800.0, 600.0), (40.0, 760.0));
        assert_eq!(Edge::Left.bounds(800.0, 600.0), (80.0, 520.0));
    }
}
