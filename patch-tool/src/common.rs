//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use image::{ColorType, DynamicImage};
pub use itertools::Itertools as _;
pub use log::{info, warn};
pub use ndarray::{Array3, Axis};
pub use patch_sampler::{
    Augmenter, AugmenterKind, Batch, DataGenerator, DataGeneratorInit, Frame, FrameSplit,
    FrameSplitInit, PatchSize, Ratio, StepSize,
};
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
