use anyhow::{Context, Result};
use clap::Parser;
use patch_tool::{config::Config, dataset::Dataset};
use prettytable::{cell, row, Table};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
/// Extract and sample segmentation patches from frame files.
enum Opts {
    /// Print frame and patch statistics.
    Info {
        /// configuration file
        config_file: PathBuf,
    },
    /// Write all sequential patches of every frame set.
    Extract {
        /// configuration file
        config_file: PathBuf,
    },
    /// Write random training batches.
    Sample {
        /// configuration file
        config_file: PathBuf,
        /// number of batches
        #[clap(long, default_value = "1")]
        steps: usize,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config_file } => info(config_file)?,
        Opts::Extract { config_file } => extract(config_file)?,
        Opts::Sample { config_file, steps } => sample(config_file, steps)?,
    }

    Ok(())
}

fn open(config_file: &Path) -> Result<(Dataset, rand::rngs::StdRng)> {
    let config = Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    let mut rng = config.sampling.rng();
    let dataset = Dataset::open(config, &mut rng)?;
    Ok((dataset, rng))
}

fn info(config_file: impl AsRef<Path>) -> Result<()> {
    let (dataset, _) = open(config_file.as_ref())?;
    let config = dataset.config();
    let patch_size = &config.patch.patch_size;
    let step_size = &config.patch.step_size;

    // print frame information
    {
        let mut table = Table::new();
        table.add_row(row![
            "index",
            "set",
            "height",
            "width",
            "image channels",
            "annotation channels",
            "degenerate",
            "patches"
        ]);

        dataset
            .frames()
            .iter()
            .enumerate()
            .for_each(|(index, frame)| {
                let set = dataset
                    .frame_set(index)
                    .map(|set| set.name())
                    .unwrap_or("-");

                table.add_row(row![
                    index,
                    set,
                    frame.height(),
                    frame.width(),
                    frame.image_channels(),
                    frame.annotation_channels(),
                    frame.is_degenerate(patch_size),
                    frame.sequential_patch_count(patch_size, step_size)
                ]);
            });

        table.printstd();
    }

    // print set information
    {
        let mut table = Table::new();
        table.add_row(row!["set", "frames", "patches", "steps per epoch"]);

        dataset.summaries().into_iter().for_each(|summary| {
            table.add_row(row![
                summary.set.name(),
                summary.num_frames,
                summary.num_patches,
                summary.steps_per_epoch
            ]);
        });

        table.printstd();
    }

    Ok(())
}

fn extract(config_file: impl AsRef<Path>) -> Result<()> {
    let (dataset, mut rng) = open(config_file.as_ref())?;
    patch_tool::extract(&dataset, &mut rng)?;
    Ok(())
}

fn sample(config_file: impl AsRef<Path>, steps: usize) -> Result<()> {
    let (dataset, rng) = open(config_file.as_ref())?;
    patch_tool::sample(&dataset, steps, rng)?;
    Ok(())
}
