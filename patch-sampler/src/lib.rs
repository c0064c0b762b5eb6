//! Patch extraction and sampling for semantic segmentation of raster frames.
//!
//! A [Frame] holds one aligned image and annotation pair. A
//! [DataGenerator] turns a set of frames into fixed-size training batches,
//! either by exhaustive sequential tiling or by weighted random sampling, and
//! optionally applies paired geometric augmentation.

mod common;
mod error;

pub mod augment;
pub mod batch;
pub mod frame;
pub mod generator;
pub mod ratio;
pub mod size;
pub mod split;

pub use augment::*;
pub use batch::*;
pub use error::*;
pub use frame::*;
pub use generator::*;
pub use ratio::*;
pub use size::*;
pub use split::*;
