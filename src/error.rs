//! Error and issue types for detection normalization.

use thiserror::Error;

/// Errors that abort normalization of a detection file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// File needs the primary ROI transform but no crop manifest has been ingested
    #[error("ROI transform not extracted; load the crop manifest before '{file_name}'")]
    MissingTransform {
        /// Name of the file that could not be placed
        file_name: String,
    },
}

/// Recoverable problems found while normalizing.
///
/// These never abort the call; the affected output is degraded instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeIssue {
    /// Crop manifest could not seed a transform; the previous one is kept
    #[error("Crop manifest '{file_name}' has no usable background object; keeping previous transform")]
    MalformedManifest {
        /// Name of the manifest file
        file_name: String,
    },

    /// Dimension-OCR detection references a missing or zero-sized dimension area
    #[error("Dimension area {crop_idx:?} missing or empty; {count} detection(s) left in crop space")]
    DegradedDimensionArea {
        /// The referenced dimension area index
        crop_idx: Option<i64>,
        /// Number of detections affected
        count: usize,
    },
}
