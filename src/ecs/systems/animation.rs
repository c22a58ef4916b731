use crate::ecs::components::Gait;

/// Step every pet's walk cycle. Runs regardless of reaction state.
pub fn advance(world: &mut hecs::World) {
    for (_, gait) in world.query_mut::<&mut Gait>() {
        gait.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Reaction, GAIT_PERIOD};
    use crate::pet::ReactionKind;

    #[test]
    fn gait_cycles_every_twenty_ticks() {
        let mut world = hecs::World::new();
        let e = world.spawn((
            Gait::default(),
            Reaction::Active {
                kind: ReactionKind::Spin,
                remaining: 5,
            },
        ));

        let mut frames = Vec::new();
        for _ in 0..2 * GAIT_PERIOD as usize {
            advance(&mut world);
            frames.push(world.get::<&Gait>(e).unwrap().frame);
        }
        assert_eq!(frames[GAIT_PERIOD as usize - 1], 0);
        assert_eq!(frames[2 * GAIT_PERIOD as usize - 1], 0);
        assert_eq!(frames[..GAIT_PERIOD as usize], frames[GAIT_PERIOD as usize..]);
    }

    #[test]
    fn mid_stride_is_first_half() {
        let strides: Vec<bool> = (0..GAIT_PERIOD)
            .map(|frame| Gait { frame }.mid_stride())
            .collect();
        assert!(strides[..10].iter().all(|&s| s));
        assert!(strides[10..].iter().all(|&s| !s));
    }
}
