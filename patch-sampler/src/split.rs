//! Random partition of frames into training, validation and test sets.

use crate::{common::*, ratio::Ratio};

/// Frame split initializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSplitInit {
    /// The fraction of frames held out for validation.
    pub validation_ratio: Ratio,
    /// The fraction of frames held out for testing.
    pub test_ratio: Ratio,
}

impl FrameSplitInit {
    /// Shuffles frame indices `0..num_frames` and partitions them.
    ///
    /// Held-out set sizes are rounded down. The training set receives the
    /// remaining frames and must not be empty.
    pub fn split<R>(&self, num_frames: usize, rng: &mut R) -> Result<FrameSplit>
    where
        R: Rng + ?Sized,
    {
        let Self {
            validation_ratio,
            test_ratio,
        } = *self;
        validation_ratio.checked_add(test_ratio)?;

        let num_validation = (num_frames as f64 * validation_ratio.to_f64()) as usize;
        let num_test = (num_frames as f64 * test_ratio.to_f64()) as usize;
        let num_training = num_frames.saturating_sub(num_validation + num_test);
        ensure_config!(
            num_training > 0,
            "no frame is left for training after holding out {} validation and {} test frames out of {}",
            num_validation,
            num_test,
            num_frames
        );

        let mut indices: Vec<_> = (0..num_frames).collect();
        indices.shuffle(rng);

        let testing = indices.split_off(num_frames - num_test);
        let validation = indices.split_off(num_training);
        let training = indices;

        debug!(
            "split {} frames into {} training, {} validation and {} test frames",
            num_frames,
            training.len(),
            validation.len(),
            testing.len()
        );

        Ok(FrameSplit {
            training,
            validation,
            testing,
        })
    }
}

impl Default for FrameSplitInit {
    fn default() -> Self {
        Self {
            validation_ratio: Ratio::zero(),
            test_ratio: Ratio::zero(),
        }
    }
}

/// Frame indices of each set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSplit {
    pub training: Vec<usize>,
    pub validation: Vec<usize>,
    pub testing: Vec<usize>,
}

impl FrameSplit {
    /// Picks the items of `frames` listed in `indices`.
    pub fn select<'a, T>(frames: &'a [T], indices: &[usize]) -> Vec<&'a T> {
        indices.iter().map(|&index| &frames[index]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_covers_all_frames() {
        let init = FrameSplitInit {
            validation_ratio: Ratio::try_from(0.2).unwrap(),
            test_ratio: Ratio::try_from(0.1).unwrap(),
        };
        let mut rng = StdRng::seed_from_u64(4);
        let split = init.split(20, &mut rng).unwrap();

        assert_eq!(split.training.len(), 14);
        assert_eq!(split.validation.len(), 4);
        assert_eq!(split.testing.len(), 2);

        let all: Vec<_> = chain_sorted(&split);
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn split_without_hold_out() {
        let mut rng = StdRng::seed_from_u64(4);
        let split = FrameSplitInit::default().split(3, &mut rng).unwrap();
        assert_eq!(split.training.len(), 3);
        assert!(split.validation.is_empty() && split.testing.is_empty());
    }

    #[test]
    fn reject_empty_training_set() {
        let mut rng = StdRng::seed_from_u64(4);
        let init = FrameSplitInit {
            validation_ratio: Ratio::try_from(0.5).unwrap(),
            test_ratio: Ratio::try_from(0.5).unwrap(),
        };
        assert!(init.split(4, &mut rng).is_err());
        assert!(FrameSplitInit::default().split(0, &mut rng).is_err());
    }

    #[test]
    fn select_frames() {
        let frames = ["a", "b", "c"];
        assert_eq!(FrameSplit::select(&frames, &[2, 0]), vec![&"c", &"a"]);
    }

    fn chain_sorted(split: &FrameSplit) -> Vec<usize> {
        split
            .training
            .iter()
            .chain(&split.validation)
            .chain(&split.testing)
            .cloned()
            .sorted()
            .collect()
    }
}
