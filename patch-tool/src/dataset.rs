//! Loaded frames partitioned into training, validation and test sets.

use crate::{common::*, config::Config, io};

/// One of the frame sets of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Training,
    Validation,
    Testing,
}

impl FrameSet {
    pub const ALL: [FrameSet; 3] = [Self::Training, Self::Validation, Self::Testing];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Validation => "validation",
            Self::Testing => "testing",
        }
    }

    pub fn indices<'a>(&self, split: &'a FrameSplit) -> &'a [usize] {
        match self {
            Self::Training => &split.training,
            Self::Validation => &split.validation,
            Self::Testing => &split.testing,
        }
    }
}

/// Patch statistics of a frame set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSummary {
    pub set: FrameSet,
    pub num_frames: usize,
    pub num_patches: usize,
    /// Full batches per pass over the sequential patches.
    pub steps_per_epoch: usize,
}

#[derive(Debug)]
pub struct Dataset {
    config: Config,
    frames: Vec<Frame>,
    split: FrameSplit,
    augmenter: Option<Augmenter>,
}

impl Dataset {
    /// Loads all frames and partitions them.
    pub fn open<R>(config: Config, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let frames = io::load_frames(&config.dataset)?;
        Self::new(config, frames, rng)
    }

    pub fn new<R>(config: Config, frames: Vec<Frame>, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if let Some(weights) = &config.sampling.frame_weights {
            patch_sampler::check_frame_weights(weights, frames.len())
                .context("invalid sampling.frame_weights")?;
        }

        let split = config.sampling.split_init().split(frames.len(), rng)?;
        let augmenter = config.sampling.augmenter.build();

        Ok(Self {
            config,
            frames,
            split,
            augmenter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn split(&self) -> &FrameSplit {
        &self.split
    }

    /// The set a frame belongs to.
    pub fn frame_set(&self, index: usize) -> Option<FrameSet> {
        FrameSet::ALL
            .into_iter()
            .find(|set| set.indices(&self.split).contains(&index))
    }

    /// Builds a generator over the frames of `set`, or `None` if the set is empty.
    ///
    /// Only the training generator uses the configured frame weights,
    /// renormalized over the training frames.
    pub fn generator(&self, set: FrameSet) -> Result<Option<DataGenerator<'_>>> {
        let indices = set.indices(&self.split);
        if indices.is_empty() {
            return Ok(None);
        }

        let frame_weights = match (set, &self.config.sampling.frame_weights) {
            (FrameSet::Training, Some(weights)) => Some(subset_weights(weights, indices)?),
            _ => None,
        };
        let patch = &self.config.patch;

        let generator = DataGeneratorInit {
            frames: FrameSplit::select(&self.frames, indices),
            patch_size: patch.patch_size,
            input_image_channel: patch.input_image_channel.clone(),
            input_label_channel: patch.input_label_channel.clone(),
            augmenter: self.augmenter.clone(),
            frame_weights,
        }
        .build()
        .with_context(|| format!("invalid {} generator", set.name()))?;

        Ok(Some(generator))
    }

    /// Sequential patch counts of every frame set.
    pub fn summaries(&self) -> Vec<SetSummary> {
        let patch_size = &self.config.patch.patch_size;
        let step_size = &self.config.patch.step_size;
        let batch_size = self.config.sampling.batch_size.get();

        FrameSet::ALL
            .into_iter()
            .map(|set| {
                let indices = set.indices(&self.split);
                let num_patches = indices
                    .iter()
                    .map(|&index| self.frames[index].sequential_patch_count(patch_size, step_size))
                    .sum();

                SetSummary {
                    set,
                    num_frames: indices.len(),
                    num_patches,
                    steps_per_epoch: num_patches / batch_size,
                }
            })
            .collect()
    }
}

/// Picks the weights of a frame subset and rescales them to sum to 1.
fn subset_weights(weights: &[f64], indices: &[usize]) -> Result<Vec<f64>> {
    let subset: Vec<f64> = indices.iter().map(|&index| weights[index]).collect();
    let sum: f64 = subset.iter().sum();
    ensure!(
        sum.is_finite() && sum > 0.0,
        "the training frames have zero total weight"
    );

    if indices.len() != weights.len() {
        info!(
            "renormalize frame weights over {} training frames",
            indices.len()
        );
    }
    Ok(subset.into_iter().map(|weight| weight / sum).collect())
}
