// ABOUTME: Rancher image UUID normalization.
// ABOUTME: Ensures image references carry the `docker:` scheme prefix exactly once.

use std::fmt;
use thiserror::Error;

/// Scheme prefix Rancher expects on a launch config's `imageUuid`.
pub const IMAGE_UUID_PREFIX: &str = "docker:";

#[derive(Debug, Error)]
pub enum ImageUuidError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("image reference contains whitespace: {0:?}")]
    Whitespace(String),
}

/// An image reference in the form Rancher stores it (`docker:nginx:1.25`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUuid(String);

impl ImageUuid {
    /// Normalize a user-supplied image reference.
    ///
    /// A bare reference (`myapp:v2`) gets the prefix prepended; one that
    /// already carries it is kept as-is.
    pub fn parse(input: &str) -> Result<Self, ImageUuidError> {
        let input = input.trim();
        if input.is_empty() || input == IMAGE_UUID_PREFIX {
            return Err(ImageUuidError::Empty);
        }
        if input.chars().any(char::is_whitespace) {
            return Err(ImageUuidError::Whitespace(input.to_string()));
        }

        if input.starts_with(IMAGE_UUID_PREFIX) {
            Ok(Self(input.to_string()))
        } else {
            Ok(Self(format!("{IMAGE_UUID_PREFIX}{input}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The image reference without the scheme prefix.
    pub fn image(&self) -> &str {
        self.0.strip_prefix(IMAGE_UUID_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ImageUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
