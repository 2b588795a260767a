// ABOUTME: Phantom-typed identifiers for Rancher resources.
// ABOUTME: Prevents accidental swapping of environment and service IDs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Rancher resource kinds an [`Id`] can point at.
pub trait Resource {
    /// Name used when the id is debug-printed.
    const KIND: &'static str;
}

pub enum EnvironmentMarker {}
pub enum ServiceMarker {}

impl Resource for EnvironmentMarker {
    const KIND: &'static str = "Environment";
}

impl Resource for ServiceMarker {
    const KIND: &'static str = "Service";
}

/// A type-safe identifier that prevents accidental mixing of different ID types.
///
/// A service's `environmentId` and its own `id` are both opaque strings on the
/// wire (`1e5`, `1s12`); keeping them apart at the type level means an index
/// lookup can't be handed the wrong one.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<T: Resource> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Id({:?})", T::KIND, self.value)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Rancher sends `null` for services that are not attached to a stack.
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Self::new(value.unwrap_or_default()))
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

pub type EnvironmentId = Id<EnvironmentMarker>;
pub type ServiceId = Id<ServiceMarker>;
