// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clustering options and their validation.

/// Default footprint inflation in pixels.
pub const DEFAULT_PIXEL_RANGE: f64 = 80.0;

/// Default minimum number of annotations that form a cluster.
pub const DEFAULT_MINIMUM_CLUSTER_SIZE: usize = 2;

/// Options controlling how annotations are clustered.
///
/// ```
/// use understory_cluster::ClusterOptions;
///
/// let options = ClusterOptions::default()
///     .with_enabled(true)
///     .with_pixel_range(40.0);
/// assert!(options.validate().is_ok());
/// assert_eq!(options.minimum_cluster_size, 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct ClusterOptions {
    /// Whether clustering is enabled. When disabled every annotation renders directly.
    pub enabled: bool,
    /// Pixels added on every side of an annotation's screen footprint before overlap testing.
    pub pixel_range: f64,
    /// Minimum number of overlapping annotations that form a cluster.
    pub minimum_cluster_size: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            pixel_range: DEFAULT_PIXEL_RANGE,
            minimum_cluster_size: DEFAULT_MINIMUM_CLUSTER_SIZE,
        }
    }
}

impl ClusterOptions {
    /// Set whether clustering is enabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the footprint inflation in pixels.
    #[must_use]
    pub fn with_pixel_range(mut self, pixel_range: f64) -> Self {
        self.pixel_range = pixel_range;
        self
    }

    /// Set the minimum cluster size.
    #[must_use]
    pub fn with_minimum_cluster_size(mut self, minimum_cluster_size: usize) -> Self {
        self.minimum_cluster_size = minimum_cluster_size;
        self
    }

    /// Check the options for values clustering cannot work with.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.pixel_range.is_finite() || self.pixel_range < 0.0 {
            return Err(OptionsError::InvalidPixelRange(self.pixel_range));
        }
        if self.minimum_cluster_size == 0 {
            return Err(OptionsError::ZeroMinimumClusterSize);
        }
        Ok(())
    }
}

/// Rejected [`ClusterOptions`].
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum OptionsError {
    /// The pixel range is negative, infinite, or NaN.
    #[error("pixel range must be a finite, non-negative number of pixels (got {0})")]
    InvalidPixelRange(f64),
    /// A cluster needs at least one member.
    #[error("minimum cluster size must be at least 1")]
    ZeroMinimumClusterSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ClusterOptions::default();
        assert!(!options.enabled);
        assert_eq!(options.pixel_range, 80.0);
        assert_eq!(options.minimum_cluster_size, 2);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            ClusterOptions::default().with_pixel_range(-1.0).validate(),
            Err(OptionsError::InvalidPixelRange(-1.0))
        );
        assert!(matches!(
            ClusterOptions::default()
                .with_pixel_range(f64::NAN)
                .validate(),
            Err(OptionsError::InvalidPixelRange(_))
        ));
        assert_eq!(
            ClusterOptions::default()
                .with_minimum_cluster_size(0)
                .validate(),
            Err(OptionsError::ZeroMinimumClusterSize)
        );
        assert_eq!(
            OptionsError::ZeroMinimumClusterSize.to_string(),
            "minimum cluster size must be at least 1"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_camel_case() {
        let options: ClusterOptions =
            serde_json::from_str(r#"{ "enabled": true, "minimumClusterSize": 3 }"#).unwrap();
        assert_eq!(
            options,
            ClusterOptions::default()
                .with_enabled(true)
                .with_minimum_cluster_size(3)
        );
    }
}
