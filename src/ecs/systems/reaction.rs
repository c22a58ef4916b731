use crate::ecs::components::{Direction, Heading, Pet, Reaction};
use crate::pet::{reaction, PetKind, ReactionKind};

/// Count down active reactions. A reaction that hits zero returns the pet
/// to idle, which also drops it back to base speed.
pub fn decay(world: &mut hecs::World) {
    for (_, (pet, state)) in world.query_mut::<(&Pet, &mut Reaction)>() {
        if state.decay() {
            log::debug!("{} calmed down", pet.0.label());
        }
    }
}

/// Start a reaction on the pet of the given kind.
///
/// Ignored while that pet is already reacting. Returns the reaction that
/// started, if any.
pub fn trigger(
    world: &mut hecs::World,
    kind: PetKind,
    rng: &mut fastrand::Rng,
) -> Option<ReactionKind> {
    for (_, (pet, state, heading)) in world.query_mut::<(&Pet, &mut Reaction, &mut Heading)>() {
        if pet.0 != kind {
            continue;
        }
        if !state.is_idle() {
            return None;
        }

        let picked = reaction::pick(kind, rng);
        *state = Reaction::Active {
            kind: picked,
            remaining: reaction::REACTION_TICKS,
        };
        if picked == ReactionKind::Flee {
            heading.0 = Direction::random(rng);
        }

        log::debug!("{} reacts: {}", kind.label(), picked.label());
        return Some(picked);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Speed, FLEE_SPEED_MULTIPLIER};
    use crate::pet::{spawn_pet, Edge, PetInit};
    use glam::Vec2;

    fn world_with(kind: PetKind, base_speed: f32) -> (hecs::World, hecs::Entity) {
        let mut world = hecs::World::new();
        let e = spawn_pet(
            &mut world,
            PetInit {
                kind,
                edge: Edge::Top,
                pos: Vec2::new(200.0, 10.0),
                direction: Direction::Increasing,
                base_speed,
            },
        );
        (world, e)
    }

    fn reaction_of(world: &hecs::World, e: hecs::Entity) -> Reaction {
        *world.get::<&Reaction>(e).unwrap()
    }

    #[test]
    fn trigger_starts_reaction_from_eligible_set() {
        let (mut world, e) = world_with(PetKind::Lion, 0.6);
        let mut rng = fastrand::Rng::with_seed(5);

        let started = trigger(&mut world, PetKind::Lion, &mut rng).unwrap();
        assert!(reaction::eligible(PetKind::Lion).contains(&started));
        assert_eq!(
            reaction_of(&world, e),
            Reaction::Active {
                kind: started,
                remaining: reaction::REACTION_TICKS
            }
        );
    }

    #[test]
    fn retrigger_while_active_is_ignored() {
        let (mut world, e) = world_with(PetKind::Dog, 0.6);
        let mut rng = fastrand::Rng::with_seed(9);

        trigger(&mut world, PetKind::Dog, &mut rng).unwrap();
        decay(&mut world);
        let before = reaction_of(&world, e);

        assert_eq!(trigger(&mut world, PetKind::Dog, &mut rng), None);
        assert_eq!(reaction_of(&world, e), before);
    }

    #[test]
    fn trigger_for_absent_kind_does_nothing() {
        let (mut world, e) = world_with(PetKind::Dog, 0.6);
        let mut rng = fastrand::Rng::with_seed(2);

        assert_eq!(trigger(&mut world, PetKind::Peacock, &mut rng), None);
        assert!(reaction_of(&world, e).is_idle());
    }

    #[test]
    fn countdown_drops_by_one_and_ends_at_zero() {
        let (mut world, e) = world_with(PetKind::Cat, 0.7);
        *world.get::<&mut Reaction>(e).unwrap() = Reaction::Active {
            kind: ReactionKind::Spin,
            remaining: 3,
        };

        decay(&mut world);
        assert_eq!(
            reaction_of(&world, e),
            Reaction::Active {
                kind: ReactionKind::Spin,
                remaining: 2
            }
        );
        decay(&mut world);
        decay(&mut world);
        assert_eq!(reaction_of(&world, e), Reaction::Idle);
        decay(&mut world);
        assert_eq!(reaction_of(&world, e), Reaction::Idle);
    }

    #[test]
    fn flee_quadruples_speed_until_it_wears_off() {
        let (mut world, e) = world_with(PetKind::Cat, 0.7);
        *world.get::<&mut Reaction>(e).unwrap() = Reaction::Active {
            kind: ReactionKind::Flee,
            remaining: reaction::REACTION_TICKS,
        };

        let speed = *world.get::<&Speed>(e).unwrap();
        let fleeing = speed.current(&reaction_of(&world, e));
        assert!((fleeing - 0.7 * FLEE_SPEED_MULTIPLIER).abs() < 1e-6);
        assert!((fleeing - 2.8).abs() < 1e-6);

        for _ in 0..reaction::REACTION_TICKS - 1 {
            decay(&mut world);
            assert!((speed.current(&reaction_of(&world, e)) - 2.8).abs() < 1e-6);
        }
        decay(&mut world);
        assert!(reaction_of(&world, e).is_idle());
        assert!((speed.current(&reaction_of(&world, e)) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn non_flee_reaction_keeps_heading() {
        let (mut world, e) = world_with(PetKind::Lion, 0.6);
        let mut rng = fastrand::Rng::with_seed(0);

        // Lion can't flee, so heading must survive any pick.
        for _ in 0..20 {
            trigger(&mut world, PetKind::Lion, &mut rng);
            assert_eq!(world.get::<&Heading>(e).unwrap().0, Direction::Increasing);
            *world.get::<&mut Reaction>(e).unwrap() = Reaction::Idle;
        }
    }

    #[test]
    fn triggered_flee_picks_a_random_heading_and_runs_fast() {
        let (mut world, e) = world_with(PetKind::Cat, 0.7);
        let mut rng = fastrand::Rng::with_seed(17);
        let mut headings = std::collections::HashSet::new();
        let mut flees = 0;

        for _ in 0..300 {
            if trigger(&mut world, PetKind::Cat, &mut rng) == Some(ReactionKind::Flee) {
                flees += 1;
                headings.insert(world.get::<&Heading>(e).unwrap().0);

                let speed = *world.get::<&Speed>(e).unwrap();
                let current = speed.current(&reaction_of(&world, e));
                assert!((current - 0.7 * FLEE_SPEED_MULTIPLIER).abs() < 1e-6);
            }
            *world.get::<&mut Reaction>(e).unwrap() = Reaction::Idle;
            world.get::<&mut Heading>(e).unwrap().0 = Direction::Increasing;
        }

        assert!(flees > 50, "only {flees} flees");
        assert!(headings.contains(&Direction::Increasing));
        assert!(headings.contains(&Direction::Decreasing));
    }
}
