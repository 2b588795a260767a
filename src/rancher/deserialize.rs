// ABOUTME: Custom serde deserializers for Rancher resources.
// ABOUTME: Rancher sends explicit nulls where an empty value is meant.

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
