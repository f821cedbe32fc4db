use crate::config::LocationSource;
use ant_core::{ArrowDirection, CueType, FlankerType, Location, TrialCondition};
use rand::Rng;
use rand::seq::SliceRandom;

/// Produces fully crossed, shuffled trial lists.
///
/// Only the location variable named by the `LocationSource` is crossed.
/// Sampling cues holds targets at `Location::Above`; sampling targets puts
/// the cue slot on the target's row, where a spatial cue is drawn.
#[derive(Debug, Clone)]
pub struct TrialFactory {
    conditions: Vec<TrialCondition>,
}

impl TrialFactory {
    pub fn new(source: LocationSource) -> Self {
        let mut conditions = Vec::new();
        for &cue_type in CueType::ALL {
            for &location in Location::ALL {
                for &target_direction in ArrowDirection::ALL {
                    for &flanker_type in FlankerType::ALL {
                        let (cue_location, target_location) = match source {
                            LocationSource::CueLocation => (location, Location::Above),
                            LocationSource::TargetLocation => (location, location),
                        };
                        conditions.push(TrialCondition {
                            cue_type,
                            cue_location,
                            target_location,
                            target_direction,
                            flanker_type,
                        });
                    }
                }
            }
        }
        Self { conditions }
    }

    /// One copy of every combination, unshuffled.
    pub fn factorial(&self) -> &[TrialCondition] {
        &self.conditions
    }

    /// `len` trials built from whole shuffled repetitions of the factorial.
    ///
    /// A trailing partial repetition is drawn from a fresh shuffle, so no
    /// combination repeats more than once more than any other.
    pub fn block<R: Rng>(&self, len: usize, rng: &mut R) -> Vec<TrialCondition> {
        let mut trials = Vec::with_capacity(len);
        while trials.len() < len {
            let mut rep = self.conditions.clone();
            rep.shuffle(rng);
            let take = (len - trials.len()).min(rep.len());
            trials.extend_from_slice(&rep[..take]);
        }
        trials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn factorial_has_every_combination_once() {
        let factory = TrialFactory::new(LocationSource::TargetLocation);
        assert_eq!(factory.factorial().len(), 4 * 2 * 2 * 3);
        let mut unique = factory.factorial().to_vec();
        unique.sort_by_key(|c| format!("{c:?}"));
        unique.dedup();
        assert_eq!(unique.len(), 48);
    }

    #[test]
    fn unsampled_location_is_held_fixed() {
        let by_cue = TrialFactory::new(LocationSource::CueLocation);
        assert!(by_cue
            .factorial()
            .iter()
            .all(|c| c.target_location == Location::Above));
        let by_target = TrialFactory::new(LocationSource::TargetLocation);
        assert!(by_target
            .factorial()
            .iter()
            .all(|c| c.cue_location == c.target_location));
        assert!(by_target
            .factorial()
            .iter()
            .any(|c| c.target_location == Location::Below));
    }

    #[test]
    fn full_repetitions_are_balanced() {
        let factory = TrialFactory::new(LocationSource::TargetLocation);
        let mut rng = StdRng::seed_from_u64(42);
        let block = factory.block(96, &mut rng);
        assert_eq!(block.len(), 96);

        let mut counts: HashMap<TrialCondition, usize> = HashMap::new();
        for c in &block {
            *counts.entry(*c).or_default() += 1;
        }
        assert_eq!(counts.len(), 48);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn partial_block_has_no_repeats() {
        let factory = TrialFactory::new(LocationSource::CueLocation);
        let mut rng = StdRng::seed_from_u64(3);
        let block = factory.block(24, &mut rng);
        let mut unique = block.clone();
        unique.sort_by_key(|c| format!("{c:?}"));
        unique.dedup();
        assert_eq!(unique.len(), 24);
    }

    #[test]
    fn blocks_are_shuffled() {
        let factory = TrialFactory::new(LocationSource::TargetLocation);
        let mut rng = StdRng::seed_from_u64(9);
        assert_ne!(factory.block(48, &mut rng), factory.factorial());
    }
}
