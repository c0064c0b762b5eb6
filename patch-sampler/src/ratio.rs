use crate::common::*;

/// A finite value within `[0, 1]`, used for probabilities and split fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ratio(R64);

impl Ratio {
    pub fn zero() -> Self {
        Self(R64::new(0.0))
    }

    pub fn one() -> Self {
        Self(R64::new(1.0))
    }

    pub fn half() -> Self {
        Self(R64::new(0.5))
    }

    pub fn to_f64(&self) -> f64 {
        self.0.raw()
    }

    pub fn checked_add(&self, rhs: Ratio) -> Result<Self> {
        Ratio::try_from(self.0 + rhs.0)
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for Ratio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::try_from(value).map_err(D::Error::custom)
    }
}

impl TryFrom<R64> for Ratio {
    type Error = Error;

    fn try_from(value: R64) -> Result<Self, Self::Error> {
        ensure_config!(
            ((0.0 - f64::EPSILON)..=(1.0 + f64::EPSILON))
                .contains(&value.raw()),
            "ratio value must be within range [0.0, 1.0], but get {}",
            value
        );
        let value = cmp::min(cmp::max(value, R64::new(0.0)), R64::new(1.0));
        Ok(Self(value))
    }
}

impl TryFrom<f64> for Ratio {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let value = R64::try_new(value)
            .ok_or_else(|| Error::Configuration(format!("{} is not a finite value", value)))?;
        Self::try_from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ratio_range() {
        assert_abs_diff_eq!(Ratio::try_from(0.25).unwrap().to_f64(), 0.25);
        assert!(Ratio::try_from(1.5).is_err());
        assert!(Ratio::try_from(-0.1).is_err());
        assert!(Ratio::try_from(f64::NAN).is_err());
        assert_eq!(Ratio::try_from(1.0 + f64::EPSILON).unwrap(), Ratio::one());
        assert!(Ratio::try_from(0.6)
            .unwrap()
            .checked_add(Ratio::try_from(0.6).unwrap())
            .is_err());
    }

    #[test]
    fn ratio_deserialize() {
        let ratio: Ratio = serde_json::from_str("0.5").unwrap();
        assert_abs_diff_eq!(ratio.to_f64(), 0.5);
        assert!(serde_json::from_str::<Ratio>("2.0").is_err());
    }
}
