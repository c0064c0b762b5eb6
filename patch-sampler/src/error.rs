//! Error types of the patch sampler.

/// The error type returned by frame extraction and patch sampling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid parameters, detected before or at the first extraction.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// An extraction window that leaves the frame extent.
    #[error(
        "extraction window at {origin:?} with size {copy_size:?} exceeds frame extent {extent:?}"
    )]
    Bounds {
        origin: [usize; 2],
        copy_size: [usize; 2],
        extent: [usize; 2],
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns early with [Error::Configuration] if the condition does not hold.
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::Error::Configuration(format!($($arg)+)));
        }
    };
}

/// Returns early with [Error::Configuration].
#[macro_export]
macro_rules! bail_config {
    ($($arg:tt)+) => {
        return Err($crate::Error::Configuration(format!($($arg)+)))
    };
}
