use crate::common::*;

/// A batch split into input and label tensors.
///
/// Both tensors are laid out in `(N, height, width, channels)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch<T = f32> {
    pub input: Array4<T>,
    pub label: Array4<T>,
}

impl<T> Batch<T> {
    /// The number of samples in the batch.
    pub fn len(&self) -> usize {
        self.input.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_channels(&self) -> usize {
        self.input.len_of(Axis(3))
    }

    pub fn label_channels(&self) -> usize {
        self.label.len_of(Axis(3))
    }
}
