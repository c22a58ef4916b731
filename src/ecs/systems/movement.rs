use crate::ecs::components::{Direction, EdgeBand, Heading, Position, Reaction, Speed};

/// Walk every pet along its edge and turn it around at the ends.
///
/// Only the bound in the direction of travel is checked, and only the
/// heading flips; position is left where the step put it, so a pet may
/// overshoot by at most one step before walking back.
pub fn advance(world: &mut hecs::World, screen_w: f32, screen_h: f32) {
    for (_, (band, pos, heading, speed, reaction)) in world.query_mut::<(
        &EdgeBand,
        &mut Position,
        &mut Heading,
        &Speed,
        &Reaction,
    )>() {
        let step = speed.current(reaction) * heading.0.sign();
        let (near, far) = band.0.bounds(screen_w, screen_h);

        let p = if band.0.is_horizontal() {
            pos.0.x += step;
            pos.0.x
        } else {
            pos.0.y += step;
            pos.0.y
        };

        heading.0 = reflect(heading.0, p, near, far);
    }
}

/// Heading after a step that landed at `p`.
pub fn reflect(direction: Direction, p: f32, near: f32, far: f32) -> Direction {
    match direction {
        Direction::Increasing if p >= far => Direction::Decreasing,
        Direction::Decreasing if p <= near => Direction::Increasing,
        d => d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::FLEE_SPEED_MULTIPLIER;
    use crate::pet::{reaction::ReactionKind, spawn_pet, Edge, PetInit, PetKind, PADDING};
    use glam::Vec2;

    fn single(edge: Edge, pos: Vec2, direction: Direction, base_speed: f32) -> (hecs::World, hecs::Entity) {
        let mut world = hecs::World::new();
        let e = spawn_pet(
            &mut world,
            PetInit {
                kind: PetKind::Dog,
                edge,
                pos,
                direction,
                base_speed,
            },
        );
        (world, e)
    }

    fn state(world: &hecs::World, e: hecs::Entity) -> (Vec2, Direction) {
        let pos = world.get::<&Position>(e).unwrap().0;
        let heading = world.get::<&Heading>(e).unwrap().0;
        (pos, heading)
    }

    #[test]
    fn steps_forward_below_far_bound() {
        let (mut world, e) = single(Edge::Top, Vec2::new(35.0, 10.0), Direction::Increasing, 0.5);
        advance(&mut world, 800.0, 600.0);

        let (pos, dir) = state(&world, e);
        assert_eq!(pos.x, 35.5);
        assert_eq!(pos.y, 10.0);
        assert_eq!(dir, Direction::Increasing);
    }

    #[test]
    fn turns_on_the_tick_it_reaches_far_bound() {
        let (mut world, e) = single(Edge::Bottom, Vec2::new(761.0, 550.0), Direction::Increasing, 0.5);
        advance(&mut world, 800.0, 600.0);

        let (pos, dir) = state(&world, e);
        assert_eq!(pos.x, 761.5);
        assert_eq!(dir, Direction::Decreasing);

        advance(&mut world, 800.0, 600.0);
        let (pos, dir) = state(&world, e);
        assert_eq!(pos.x, 761.0);
        assert_eq!(dir, Direction::Decreasing);
    }

    #[test]
    fn turns_at_near_bound() {
        let (mut world, e) = single(Edge::Top, Vec2::new(40.3, 10.0), Direction::Decreasing, 0.5);
        advance(&mut world, 800.0, 600.0);
        assert_eq!(state(&world, e).1, Direction::Increasing);
    }

    #[test]
    fn vertical_edges_use_wider_margin() {
        // 85 - 0.5 is inside the 40px band but still above the 80px left/right threshold.
        let (mut world, e) = single(Edge::Left, Vec2::new(10.0, 85.0), Direction::Decreasing, 0.5);
        advance(&mut world, 800.0, 600.0);
        let (pos, dir) = state(&world, e);
        assert_eq!(pos.y, 84.5);
        assert_eq!(pos.x, 10.0);
        assert_eq!(dir, Direction::Decreasing);

        for _ in 0..10 {
            advance(&mut world, 800.0, 600.0);
        }
        assert_eq!(state(&world, e).1, Direction::Increasing);

        let (mut world, e) = single(Edge::Right, Vec2::new(750.0, 519.0), Direction::Increasing, 1.0);
        advance(&mut world, 800.0, 600.0);
        assert_eq!(state(&world, e).1, Direction::Decreasing);
    }

    #[test]
    fn stays_within_one_step_of_bounds_over_long_runs() {
        let (w, h) = (640.0, 480.0);
        let mut rng = fastrand::Rng::with_seed(21);
        let mut world = hecs::World::new();
        crate::pet::spawn_pets(&mut world, w, h, &mut rng);

        // A flee can point a pet that just overshot back outward for one more step.
        let slack = 2.0 * FLEE_SPEED_MULTIPLIER;
        for tick in 0..5000 {
            if tick % 97 == 0 {
                for kind in PetKind::ALL {
                    crate::ecs::systems::reaction::trigger(&mut world, kind, &mut rng);
                }
            }
            crate::ecs::systems::tick(&mut world, w, h);

            // Spawn spots sit slightly outside the walking band; give pets time to walk in.
            if tick < 200 {
                continue;
            }

            for (_, (band, pos)) in world.query::<(&EdgeBand, &Position)>().iter() {
                let (near, far) = band.0.bounds(w, h);
                let p = if band.0.is_horizontal() { pos.0.x } else { pos.0.y };
                assert!(
                    p >= near - slack && p <= far + slack,
                    "{:?} at {p} outside [{near}, {far}]",
                    band.0
                );
            }
        }
    }

    #[test]
    fn reflect_never_flips_twice() {
        assert_eq!(reflect(Direction::Increasing, 900.0, PADDING, 760.0), Direction::Decreasing);
        assert_eq!(reflect(Direction::Decreasing, 900.0, PADDING, 760.0), Direction::Decreasing);
        assert_eq!(reflect(Direction::Decreasing, 10.0, PADDING, 760.0), Direction::Increasing);
        assert_eq!(reflect(Direction::Increasing, 10.0, PADDING, 760.0), Direction::Increasing);
    }

    #[test]
    fn flee_moves_four_times_as_far() {
        let (mut world, e) = single(Edge::Top, Vec2::new(300.0, 10.0), Direction::Increasing, 0.5);
        *world.get::<&mut Reaction>(e).unwrap() = Reaction::Active {
            kind: ReactionKind::Flee,
            remaining: 10,
        };
        advance(&mut world, 800.0, 600.0);
        assert_eq!(state(&world, e).0.x, 302.0);
    }
}
