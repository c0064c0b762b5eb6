//! Preprocessing driver that turns frame files into patch files.

pub mod common;
pub mod config;
pub mod dataset;
pub mod io;

use crate::{
    common::*,
    dataset::{Dataset, FrameSet},
};

/// Extracts the sequential patches of every non-empty frame set into
/// `<output>/<set>/`.
///
/// Returns the number of patches written per set.
pub fn extract<R>(dataset: &Dataset, rng: &mut R) -> Result<Vec<(FrameSet, usize)>>
where
    R: Rng + ?Sized,
{
    let config = dataset.config();
    let mut counts = vec![];

    for set in FrameSet::ALL {
        let generator = match dataset.generator(set)? {
            Some(generator) => generator,
            None => continue,
        };
        let batch = generator.all_sequential_patches(&config.patch.step_size, rng)?;
        let dir = config.output.dir.join(set.name());
        let count = io::save_patches(&dir, &batch, 0)?;
        info!(
            "wrote {} {} patches to '{}'",
            count,
            set.name(),
            dir.display()
        );
        counts.push((set, count));
    }

    Ok(counts)
}

/// Pulls `steps` random batches from the training frames and writes them to
/// `<output>/batches/`.
pub fn sample<R>(dataset: &Dataset, steps: usize, rng: R) -> Result<Vec<PathBuf>>
where
    R: Rng,
{
    let config = dataset.config();
    let generator = dataset
        .generator(FrameSet::Training)?
        .ok_or_else(|| format_err!("the training set is empty"))?;
    let dir = config.output.dir.join("batches");

    let paths: Vec<_> = generator
        .random_stream(config.sampling.batch_size.get(), rng)
        .take(steps)
        .enumerate()
        .map(|(step, batch)| -> Result<_> { io::save_batch(&dir, step, &batch?) })
        .try_collect()?;

    info!("wrote {} batches to '{}'", paths.len(), dir.display());
    Ok(paths)
}
