// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod image_uuid;
mod target;

pub use id::{EnvironmentId, Id, Resource, ServiceId};
pub use image_uuid::{IMAGE_UUID_PREFIX, ImageUuid, ImageUuidError};
pub use target::{ServiceTarget, TargetError};
