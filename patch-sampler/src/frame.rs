//! Aligned image and annotation pairs and patch extraction.

use crate::{
    common::*,
    size::{PatchSize, StepSize},
};

/// A channel-stacked patch in `(height, width, channels)` layout.
///
/// The image channels come first, followed by the annotation channels.
pub type Patch<T = f32> = Array3<T>;

/// One spatially aligned image and annotation pair.
///
/// Both arrays are laid out in `(height, width, channels)` and share the same
/// height and width. The element type determines the type of the
/// materialized patches.
#[derive(Debug, Clone)]
pub struct Frame<T = f32> {
    image: Array3<T>,
    annotation: Array3<T>,
}

impl<T> Frame<T>
where
    T: Clone + Zero,
{
    pub fn new(image: Array3<T>, annotation: Array3<T>) -> Result<Self> {
        let (img_h, img_w, _) = image.dim();
        let (ann_h, ann_w, _) = annotation.dim();
        ensure_config!(
            img_h == ann_h && img_w == ann_w,
            "image extent ({}, {}) does not match annotation extent ({}, {})",
            img_h,
            img_w,
            ann_h,
            ann_w
        );

        Ok(Self { image, annotation })
    }

    /// Creates a frame from a single-band label map.
    pub fn with_label_map(image: Array3<T>, annotation: Array2<T>) -> Result<Self> {
        Self::new(image, annotation.insert_axis(Axis(2)))
    }

    pub fn image(&self) -> &Array3<T> {
        &self.image
    }

    pub fn annotation(&self) -> &Array3<T> {
        &self.annotation
    }

    pub fn height(&self) -> usize {
        self.image.dim().0
    }

    pub fn width(&self) -> usize {
        self.image.dim().1
    }

    pub fn image_channels(&self) -> usize {
        self.image.dim().2
    }

    pub fn annotation_channels(&self) -> usize {
        self.annotation.dim().2
    }

    /// The channel count of a patch taken from this frame.
    pub fn channels(&self) -> usize {
        self.image_channels() + self.annotation_channels()
    }

    /// The region copied into every patch, `(min(H, ph), min(W, pw))`.
    pub fn copy_size(&self, patch_size: &PatchSize) -> [usize; 2] {
        [
            self.height().min(patch_size.h()),
            self.width().min(patch_size.w()),
        ]
    }

    /// Returns true if the frame is smaller than the patch on some axis.
    pub fn is_degenerate(&self, patch_size: &PatchSize) -> bool {
        self.height() < patch_size.h() || self.width() < patch_size.w()
    }

    /// Extracts one patch whose top-left corner sits at `origin`.
    ///
    /// A zero-filled array of `patch_size` is created, and the
    /// `copy_size` region starting at `origin` is copied into its top-left
    /// corner. The remaining area stays zero. The caller computes
    /// `copy_size`; a window leaving the frame is a [Error::Bounds].
    pub fn extract_patch(
        &self,
        origin: [usize; 2],
        patch_size: &PatchSize,
        copy_size: [usize; 2],
    ) -> Result<Patch<T>> {
        ensure_config!(
            patch_size.c() == self.channels(),
            "patch size expects {} channels, but the frame has {} image and {} annotation channels",
            patch_size.c(),
            self.image_channels(),
            self.annotation_channels()
        );

        let [i, j] = origin;
        let [copy_h, copy_w] = copy_size;
        let bounds_error = || Error::Bounds {
            origin,
            copy_size,
            extent: [self.height(), self.width()],
        };
        let end_i = i.checked_add(copy_h).ok_or_else(bounds_error)?;
        let end_j = j.checked_add(copy_w).ok_or_else(bounds_error)?;
        if end_i > self.height() || end_j > self.width() {
            return Err(bounds_error());
        }
        if copy_h > patch_size.h() || copy_w > patch_size.w() {
            return Err(Error::Bounds {
                origin: [0, 0],
                copy_size,
                extent: patch_size.hw(),
            });
        }

        let img_c = self.image_channels();
        let mut patch = Array3::zeros(patch_size.to_array());
        patch
            .slice_mut(s![..copy_h, ..copy_w, ..img_c])
            .assign(&self.image.slice(s![i..end_i, j..end_j, ..]));
        patch
            .slice_mut(s![..copy_h, ..copy_w, img_c..])
            .assign(&self.annotation.slice(s![i..end_i, j..end_j, ..]));

        Ok(patch)
    }

    /// The patch origins visited by sequential enumeration, rows first.
    ///
    /// Offsets along each axis are `0, step, 2 * step, ...` strictly below
    /// `extent - patch`, or only `0` when the frame does not exceed the patch.
    /// A trailing window aligned to the far edge is not added.
    pub fn sequential_origins(
        &self,
        patch_size: &PatchSize,
        step_size: &StepSize,
    ) -> Vec<[usize; 2]> {
        let rows = axis_offsets(self.height(), patch_size.h(), step_size.h());
        let cols = axis_offsets(self.width(), patch_size.w(), step_size.w());
        iproduct!(rows, cols).map(|(i, j)| [i, j]).collect()
    }

    /// The number of patches [Frame::sequential_patches] produces.
    pub fn sequential_patch_count(
        &self,
        patch_size: &PatchSize,
        step_size: &StepSize,
    ) -> usize {
        axis_count(self.height(), patch_size.h(), step_size.h())
            * axis_count(self.width(), patch_size.w(), step_size.w())
    }

    /// Extracts all patches in sequential order.
    pub fn sequential_patches(
        &self,
        patch_size: &PatchSize,
        step_size: &StepSize,
    ) -> Result<Vec<Patch<T>>> {
        if self.is_degenerate(patch_size) {
            debug!(
                "frame of extent ({}, {}) is padded to patch extent ({}, {})",
                self.height(),
                self.width(),
                patch_size.h(),
                patch_size.w()
            );
        }

        let copy_size = self.copy_size(patch_size);
        self.sequential_origins(patch_size, step_size)
            .into_iter()
            .map(|origin| self.extract_patch(origin, patch_size, copy_size))
            .collect()
    }

    /// Draws a patch origin uniformly from `[0, H - ph) x [0, W - pw)`.
    ///
    /// An axis on which the frame does not exceed the patch is fixed at 0.
    pub fn random_origin<R>(&self, patch_size: &PatchSize, rng: &mut R) -> [usize; 2]
    where
        R: Rng + ?Sized,
    {
        let i = random_offset(self.height(), patch_size.h(), rng);
        let j = random_offset(self.width(), patch_size.w(), rng);
        [i, j]
    }

    /// Extracts one patch at a random origin.
    pub fn random_patch<R>(&self, patch_size: &PatchSize, rng: &mut R) -> Result<Patch<T>>
    where
        R: Rng + ?Sized,
    {
        let origin = self.random_origin(patch_size, rng);
        self.extract_patch(origin, patch_size, self.copy_size(patch_size))
    }
}

fn axis_offsets(extent: usize, patch: usize, step: usize) -> Vec<usize> {
    if extent <= patch {
        vec![0]
    } else {
        (0..(extent - patch)).step_by(step).collect()
    }
}

fn axis_count(extent: usize, patch: usize, step: usize) -> usize {
    if extent <= patch {
        1
    } else {
        (extent - patch - 1) / step + 1
    }
}

fn random_offset<R>(extent: usize, patch: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    if extent <= patch {
        0
    } else {
        rng.gen_range(0..(extent - patch))
    }
}
