pub use crate::error::{Error, Result};
pub use crate::{bail_config, ensure_config};
pub use itertools::{iproduct, izip, Itertools as _};
pub use log::{debug, info, warn};
pub use ndarray::{s, Array2, Array3, Array4, ArrayView3, Axis};
pub use noisy_float::prelude::*;
pub use num_traits::Zero;
pub use rand::{
    distributions::{Distribution, WeightedIndex},
    prelude::*,
    rngs::StdRng,
    seq::SliceRandom,
};
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    cmp,
    convert::TryFrom,
    fmt::Debug,
    str::FromStr,
};
