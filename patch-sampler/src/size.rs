//! Validated patch and step sizes.

use crate::common::*;

/// The size of an extracted patch in `(height, width, channels)`.
///
/// The channel count covers the image channels followed by the annotation
/// channels of the frame the patch is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchSize {
    h: usize,
    w: usize,
    c: usize,
}

impl PatchSize {
    pub fn new(h: usize, w: usize, c: usize) -> Result<Self> {
        ensure_config!(
            h > 0 && w > 0 && c > 0,
            "patch size must be positive, but get ({}, {}, {})",
            h,
            w,
            c
        );
        Ok(Self { h, w, c })
    }

    pub fn h(&self) -> usize {
        self.h
    }

    pub fn w(&self) -> usize {
        self.w
    }

    pub fn c(&self) -> usize {
        self.c
    }

    pub fn hw(&self) -> [usize; 2] {
        [self.h, self.w]
    }

    pub fn to_array(&self) -> [usize; 3] {
        [self.h, self.w, self.c]
    }
}

impl TryFrom<[usize; 3]> for PatchSize {
    type Error = Error;

    fn try_from([h, w, c]: [usize; 3]) -> Result<Self, Self::Error> {
        Self::new(h, w, c)
    }
}

impl Serialize for PatchSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PatchSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [h, w, c] = <[usize; 3]>::deserialize(deserializer)?;
        Self::new(h, w, c).map_err(D::Error::custom)
    }
}

/// The stride of sequential patch enumeration in `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepSize {
    h: usize,
    w: usize,
}

impl StepSize {
    pub fn new(h: usize, w: usize) -> Result<Self> {
        ensure_config!(
            h > 0 && w > 0,
            "step size must be positive, but get ({}, {})",
            h,
            w
        );
        Ok(Self { h, w })
    }

    pub fn h(&self) -> usize {
        self.h
    }

    pub fn w(&self) -> usize {
        self.w
    }
}

impl TryFrom<[usize; 2]> for StepSize {
    type Error = Error;

    fn try_from([h, w]: [usize; 2]) -> Result<Self, Self::Error> {
        Self::new(h, w)
    }
}

impl Serialize for StepSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [self.h, self.w].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StepSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [h, w] = <[usize; 2]>::deserialize(deserializer)?;
        Self::new(h, w).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_zero_dimensions() {
        assert!(matches!(
            PatchSize::new(0, 8, 3),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            PatchSize::new(8, 8, 0),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(StepSize::new(4, 0), Err(Error::Configuration(_))));
        assert_eq!(PatchSize::new(8, 4, 2).unwrap().to_array(), [8, 4, 2]);
    }

    #[test]
    fn deserialize_sizes() {
        let patch: PatchSize = serde_json::from_str("[576, 576, 6]").unwrap();
        assert_eq!(patch.hw(), [576, 576]);
        assert_eq!(patch.c(), 6);

        let step: StepSize = serde_json::from_str("[288, 144]").unwrap();
        assert_eq!((step.h(), step.w()), (288, 144));

        assert!(serde_json::from_str::<StepSize>("[0, 1]").is_err());
        assert_eq!(serde_json::to_string(&patch).unwrap(), "[576,576,6]");
    }
}
