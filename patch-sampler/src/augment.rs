//! Paired geometric augmentation of image and label batches.
//!
//! An [Augmenter] is built once. For every batch the caller freezes it into a
//! [FrozenAugmenter], which replays one realized set of random decisions on
//! as many tensors as needed. Applying the frozen handle to an image batch
//! and its label batch flips both in exactly the same way.

use crate::{common::*, ratio::Ratio};

/// Augmentation selector used in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmenterKind {
    None,
    Geometric,
}

impl AugmenterKind {
    /// Builds the pipeline this selector stands for, if any.
    pub fn build(&self) -> Option<Augmenter> {
        match self {
            Self::None => None,
            Self::Geometric => Some(AugmenterInit::default().build()),
        }
    }
}

impl Default for AugmenterKind {
    fn default() -> Self {
        Self::None
    }
}

impl FromStr for AugmenterKind {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let kind = match text {
            "none" => Self::None,
            "geometric" => Self::Geometric,
            _ => bail_config!(
                "'{}' is not a valid augmenter, expect 'none' or 'geometric'",
                text
            ),
        };
        Ok(kind)
    }
}

/// Augmenter initializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AugmenterInit {
    /// The probability to flip a sample left to right.
    pub horizontal_flip_prob: Ratio,
    /// The probability to flip a sample upside down.
    pub vertical_flip_prob: Ratio,
    /// If set, the transforms run in a random order per sample.
    pub random_order: bool,
}

impl AugmenterInit {
    pub fn build(self) -> Augmenter {
        let Self {
            horizontal_flip_prob,
            vertical_flip_prob,
            random_order,
        } = self;

        Augmenter {
            transforms: vec![
                (Flip::Horizontal, horizontal_flip_prob.to_f64()),
                (Flip::Vertical, vertical_flip_prob.to_f64()),
            ],
            random_order,
        }
    }
}

impl Default for AugmenterInit {
    fn default() -> Self {
        let half = Ratio::half();
        Self {
            horizontal_flip_prob: half,
            vertical_flip_prob: half,
            random_order: true,
        }
    }
}

/// A single geometric transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flip {
    /// Reverses the width axis.
    Horizontal,
    /// Reverses the height axis.
    Vertical,
}

/// The realized transforms of one sample, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SampleTransform {
    pub flips: Vec<Flip>,
}

impl SampleTransform {
    /// Returns true if the sample ends up mirrored left to right.
    pub fn is_horizontally_flipped(&self) -> bool {
        self.count(Flip::Horizontal) % 2 == 1
    }

    /// Returns true if the sample ends up mirrored upside down.
    pub fn is_vertically_flipped(&self) -> bool {
        self.count(Flip::Vertical) % 2 == 1
    }

    fn count(&self, flip: Flip) -> usize {
        self.flips.iter().filter(|&&other| other == flip).count()
    }

    /// Transforms one `(height, width, channels)` sample.
    fn apply<T>(&self, sample: ArrayView3<'_, T>) -> Array3<T>
    where
        T: Clone,
    {
        self.flips
            .iter()
            .fold(sample, |view, flip| match flip {
                Flip::Horizontal => view.slice_move(s![.., ..;-1, ..]),
                Flip::Vertical => view.slice_move(s![..;-1, .., ..]),
            })
            .to_owned()
    }
}

/// A randomized pipeline of geometric transforms.
#[derive(Debug, Clone)]
pub struct Augmenter {
    transforms: Vec<(Flip, f64)>,
    random_order: bool,
}

impl Augmenter {
    /// Fixes the random decisions for one batch.
    ///
    /// This is the only step that draws from `rng`.
    pub fn freeze<R>(&self, rng: &mut R) -> FrozenAugmenter
    where
        R: Rng + ?Sized,
    {
        FrozenAugmenter {
            augmenter: self.clone(),
            seed: rng.gen(),
        }
    }

    fn draw(&self, rng: &mut StdRng) -> SampleTransform {
        let mut order: Vec<_> = (0..self.transforms.len()).collect();
        if self.random_order {
            order.shuffle(rng);
        }

        let flips = order
            .into_iter()
            .filter_map(|index| {
                let (flip, prob) = self.transforms[index];
                rng.gen_bool(prob).then(|| flip)
            })
            .collect();

        SampleTransform { flips }
    }
}

/// An [Augmenter] with its random decisions fixed.
#[derive(Debug, Clone)]
pub struct FrozenAugmenter {
    augmenter: Augmenter,
    seed: u64,
}

impl FrozenAugmenter {
    /// The transforms applied to the first `num_samples` samples of a batch.
    pub fn decisions(&self, num_samples: usize) -> Vec<SampleTransform> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..num_samples)
            .map(|_| self.augmenter.draw(&mut rng))
            .collect()
    }

    /// Transforms an `(N, height, width, channels)` batch.
    ///
    /// Every call replays the same decisions, so tensors sharing the sample
    /// axis are transformed identically.
    pub fn apply<T>(&self, batch: &Array4<T>) -> Array4<T>
    where
        T: Clone + Zero,
    {
        let decisions = self.decisions(batch.len_of(Axis(0)));
        let mut output = Array4::zeros(batch.raw_dim());

        izip!(output.outer_iter_mut(), batch.outer_iter(), &decisions).for_each(
            |(mut target, sample, transform)| {
                target.assign(&transform.apply(sample));
            },
        );

        output
    }
}
