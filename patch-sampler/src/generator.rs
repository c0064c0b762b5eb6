//! Sequential and random patch generation over a set of frames.

use crate::{
    augment::Augmenter,
    batch::Batch,
    common::*,
    frame::{Frame, Patch},
    size::{PatchSize, StepSize},
};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Data generator initializer.
#[derive(Debug, Clone)]
pub struct DataGeneratorInit<'a, T = f32> {
    /// The frames assigned to this generator.
    pub frames: Vec<&'a Frame<T>>,
    /// The size of generated patches, image and annotation channels included.
    pub patch_size: PatchSize,
    /// Patch channels forming the input tensor.
    pub input_image_channel: Vec<usize>,
    /// Patch channels forming the label tensor.
    pub input_label_channel: Vec<usize>,
    /// The augmentation applied to every produced batch.
    pub augmenter: Option<Augmenter>,
    /// Per-frame selection probabilities for random sampling. Frames are
    /// chosen uniformly if not set.
    pub frame_weights: Option<Vec<f64>>,
}

impl<'a, T> DataGeneratorInit<'a, T>
where
    T: Clone + Zero,
{
    pub fn build(self) -> Result<DataGenerator<'a, T>> {
        let Self {
            frames,
            patch_size,
            input_image_channel,
            input_label_channel,
            augmenter,
            frame_weights,
        } = self;

        ensure_config!(!frames.is_empty(), "at least one frame is required");

        for (index, frame) in frames.iter().enumerate() {
            ensure_config!(
                frame.channels() == patch_size.c(),
                "frame {} has {} channels, but the patch size expects {} channels",
                index,
                frame.channels(),
                patch_size.c()
            );

            if frame.is_degenerate(&patch_size) {
                warn!(
                    "frame {} of extent ({}, {}) is smaller than patch extent ({}, {}), its patches are zero-padded",
                    index,
                    frame.height(),
                    frame.width(),
                    patch_size.h(),
                    patch_size.w()
                );
            }
        }

        check_channels("input_image_channel", &input_image_channel, &patch_size)?;
        check_channels("input_label_channel", &input_label_channel, &patch_size)?;

        let frame_selector = match frame_weights {
            Some(weights) => FrameSelector::new_weighted(&weights, frames.len())?,
            None => FrameSelector::Uniform,
        };

        Ok(DataGenerator {
            frames,
            patch_size,
            input_image_channel,
            input_label_channel,
            augmenter,
            frame_selector,
        })
    }
}

fn check_channels(name: &str, channels: &[usize], patch_size: &PatchSize) -> Result<()> {
    ensure_config!(!channels.is_empty(), "{} must not be empty", name);
    if let Some(&channel) = channels.iter().find(|&&channel| channel >= patch_size.c()) {
        bail_config!(
            "{} refers to channel {}, but patches only have {} channels",
            name,
            channel,
            patch_size.c()
        );
    }
    Ok(())
}

/// Checks that `weights` is a probability vector over `num_frames` frames.
///
/// Every weight must be finite and non-negative, and the weights must sum to
/// 1 within `1e-6`.
pub fn check_frame_weights(weights: &[f64], num_frames: usize) -> Result<()> {
    ensure_config!(
        weights.len() == num_frames,
        "expect {} frame weights, but get {}",
        num_frames,
        weights.len()
    );
    ensure_config!(
        weights
            .iter()
            .all(|&weight| weight.is_finite() && weight >= 0.0),
        "frame weights must be finite and non-negative"
    );
    let sum: f64 = weights.iter().sum();
    ensure_config!(
        (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
        "frame weights must sum to 1, but get {}",
        sum
    );
    Ok(())
}

#[derive(Debug, Clone)]
enum FrameSelector {
    Uniform,
    Weighted(WeightedIndex<f64>),
}

impl FrameSelector {
    fn new_weighted(weights: &[f64], num_frames: usize) -> Result<Self> {
        check_frame_weights(weights, num_frames)?;
        let dist = WeightedIndex::new(weights)
            .map_err(|err| Error::Configuration(format!("invalid frame weights: {}", err)))?;
        Ok(Self::Weighted(dist))
    }
}

/// Produces training batches from a set of frames.
///
/// The generator borrows its frames and never modifies them.
#[derive(Debug, Clone)]
pub struct DataGenerator<'a, T = f32> {
    frames: Vec<&'a Frame<T>>,
    patch_size: PatchSize,
    input_image_channel: Vec<usize>,
    input_label_channel: Vec<usize>,
    augmenter: Option<Augmenter>,
    frame_selector: FrameSelector,
}

impl<'a, T> DataGenerator<'a, T>
where
    T: Clone + Zero,
{
    pub fn frames(&self) -> &[&'a Frame<T>] {
        &self.frames
    }

    pub fn patch_size(&self) -> &PatchSize {
        &self.patch_size
    }

    /// Picks a frame index according to the frame weights.
    pub fn choose_frame<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        match &self.frame_selector {
            FrameSelector::Uniform => rng.gen_range(0..self.frames.len()),
            FrameSelector::Weighted(dist) => dist.sample(rng),
        }
    }

    /// The number of patches [DataGenerator::all_sequential_patches] produces.
    pub fn sequential_patch_count(&self, step_size: &StepSize) -> usize {
        self.frames
            .iter()
            .map(|frame| frame.sequential_patch_count(&self.patch_size, step_size))
            .sum()
    }

    /// Extracts all sequential patches of all frames into one batch.
    ///
    /// Patches are ordered by frame, then by their order within the frame.
    /// The `rng` is only used by augmentation.
    pub fn all_sequential_patches<R>(
        &self,
        step_size: &StepSize,
        rng: &mut R,
    ) -> Result<Batch<T>>
    where
        R: Rng + ?Sized,
    {
        let mut patches = Vec::with_capacity(self.sequential_patch_count(step_size));
        for frame in &self.frames {
            patches.extend(frame.sequential_patches(&self.patch_size, step_size)?);
        }
        info!(
            "extracted {} sequential patches from {} frames",
            patches.len(),
            self.frames.len()
        );

        self.make_batch(&patches, rng)
    }

    /// Draws a batch of independently sampled patches.
    ///
    /// Each patch comes from a frame picked by the frame weights, at a
    /// uniformly drawn origin. A frame may be picked more than once.
    pub fn random_batch<R>(&self, batch_size: usize, rng: &mut R) -> Result<Batch<T>>
    where
        R: Rng + ?Sized,
    {
        ensure_config!(batch_size > 0, "batch size must be positive");

        let patches: Vec<_> = (0..batch_size)
            .map(|_| {
                let index = self.choose_frame(rng);
                self.frames[index].random_patch(&self.patch_size, rng)
            })
            .try_collect()?;

        self.make_batch(&patches, rng)
    }

    /// An endless iterator of random batches.
    ///
    /// Every pull draws one fresh batch. The consumer decides when to stop.
    pub fn random_stream<R>(&self, batch_size: usize, rng: R) -> RandomBatches<'_, 'a, T, R>
    where
        R: Rng,
    {
        RandomBatches {
            generator: self,
            batch_size,
            rng,
        }
    }

    fn make_batch<R>(&self, patches: &[Patch<T>], rng: &mut R) -> Result<Batch<T>>
    where
        R: Rng + ?Sized,
    {
        let [h, w, c] = self.patch_size.to_array();
        let mut data = Array4::zeros((patches.len(), h, w, c));
        izip!(data.outer_iter_mut(), patches).for_each(|(mut slot, patch)| {
            slot.assign(patch);
        });

        let input = data.select(Axis(3), &self.input_image_channel);
        let label = data.select(Axis(3), &self.input_label_channel);

        let batch = match &self.augmenter {
            Some(augmenter) => {
                let frozen = augmenter.freeze(rng);
                Batch {
                    input: frozen.apply(&input),
                    label: frozen.apply(&label),
                }
            }
            None => Batch { input, label },
        };

        Ok(batch)
    }
}

/// The endless batch iterator created by [DataGenerator::random_stream].
#[derive(Debug)]
pub struct RandomBatches<'g, 'a, T, R> {
    generator: &'g DataGenerator<'a, T>,
    batch_size: usize,
    rng: R,
}

impl<'g, 'a, T, R> Iterator for RandomBatches<'g, 'a, T, R>
where
    T: Clone + Zero,
    R: Rng,
{
    type Item = Result<Batch<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generator.random_batch(self.batch_size, &mut self.rng))
    }
}
