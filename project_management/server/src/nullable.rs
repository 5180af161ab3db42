//! Field deserializers that read an explicit JSON `null` as the field's zero
//! value, the same as an absent field.

use crate::entities::zero_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// `null` becomes `T::default()`: `""` for strings, the nil UUID for IDs.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// `null` becomes [`zero_timestamp`] rather than the Unix epoch.
pub fn or_zero_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer)
        .map(|value| value.unwrap_or_else(zero_timestamp))
}
