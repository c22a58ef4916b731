use super::PetKind;

/// How long a reaction lasts, in ticks (~1s at 16ms).
pub const REACTION_TICKS: u32 = 60;

/// Short-lived responses to the pointer entering a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    /// Runs off at 4x speed in a random direction.
    Flee,
    Hop,
    Spin,
    /// Shows a heart above the pet.
    Love,
}

impl ReactionKind {
    pub fn label(self) -> &'static str {
        match self {
            ReactionKind::Flee => "Flee",
            ReactionKind::Hop => "Hop",
            ReactionKind::Spin => "Spin",
            ReactionKind::Love => "Love",
        }
    }
}

const DOG: &[ReactionKind] = &[ReactionKind::Hop, ReactionKind::Spin, ReactionKind::Love];
const CAT: &[ReactionKind] = &[ReactionKind::Flee, ReactionKind::Spin, ReactionKind::Love];
const MONKEY: &[ReactionKind] = &[ReactionKind::Hop, ReactionKind::Spin, ReactionKind::Flee];
const LION: &[ReactionKind] = &[ReactionKind::Hop, ReactionKind::Love];
const PEACOCK: &[ReactionKind] = &[ReactionKind::Flee, ReactionKind::Spin, ReactionKind::Love];

/// Reactions each pet may pick from. Never empty.
pub fn eligible(kind: PetKind) -> &'static [ReactionKind] {
    match kind {
        PetKind::Dog => DOG,
        PetKind::Cat => CAT,
        PetKind::Monkey => MONKEY,
        PetKind::Lion => LION,
        PetKind::Peacock => PEACOCK,
    }
}

/// Uniformly pick one of the pet's eligible reactions.
pub fn pick(kind: PetKind, rng: &mut fastrand::Rng) -> ReactionKind {
    let options = eligible(kind);
    options[rng.usize(0..options.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pet_has_reactions() {
        for kind in PetKind::ALL {
            assert!(!eligible(kind).is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn picks_only_from_eligible_set() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..200 {
            let r = pick(PetKind::Lion, &mut rng);
            assert!(matches!(r, ReactionKind::Hop | ReactionKind::Love));
        }
    }

    #[test]
    fn pick_covers_whole_set() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(pick(PetKind::Cat, &mut rng));
        }
        assert_eq!(seen.len(), eligible(PetKind::Cat).len());
    }
}
