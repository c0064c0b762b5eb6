//! Patch tool configuration format.

use crate::common::*;

pub use dataset::*;
pub use sampling::*;

/// The main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub patch: PatchConfig,
    pub sampling: SamplingConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

mod dataset {
    use super::*;

    /// The location and naming scheme of frame files.
    ///
    /// The `k`-th frame is stored in `<image_prefix>_<k>.<image_ext>` and
    /// `<annotation_prefix>_<k>.<annotation_ext>` under `dir`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        pub dir: PathBuf,
        #[serde(default = "default_image_prefix")]
        pub image_prefix: String,
        #[serde(default = "default_annotation_prefix")]
        pub annotation_prefix: String,
        #[serde(default = "default_image_ext")]
        pub image_ext: String,
        #[serde(default = "default_annotation_ext")]
        pub annotation_ext: String,
    }

    fn default_image_prefix() -> String {
        "image".into()
    }

    fn default_annotation_prefix() -> String {
        "annotation".into()
    }

    fn default_image_ext() -> String {
        "tif".into()
    }

    fn default_annotation_ext() -> String {
        "png".into()
    }
}

/// Patch geometry and channel selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Patch `[height, width, channels]`, image and annotation channels included.
    pub patch_size: PatchSize,
    /// Sequential stride `[height, width]`.
    pub step_size: StepSize,
    pub input_image_channel: Vec<usize>,
    pub input_label_channel: Vec<usize>,
}

mod sampling {
    use super::*;

    /// Batch sampling options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SamplingConfig {
        pub batch_size: NonZeroUsize,
        #[serde(default)]
        pub augmenter: AugmenterKind,
        /// Per-frame probabilities of random sampling, in frame order.
        #[serde(default)]
        pub frame_weights: Option<Vec<f64>>,
        /// Fixed seed of the random source. Drawn from entropy if not set.
        #[serde(default)]
        pub seed: Option<u64>,
        #[serde(default = "Ratio::zero")]
        pub validation_ratio: Ratio,
        #[serde(default = "Ratio::zero")]
        pub test_ratio: Ratio,
    }

    impl SamplingConfig {
        pub fn split_init(&self) -> FrameSplitInit {
            FrameSplitInit {
                validation_ratio: self.validation_ratio,
                test_ratio: self.test_ratio,
            }
        }

        pub fn rng(&self) -> StdRng {
            match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }
        }
    }
}

/// Output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}
