//! Error types for scene construction and render configuration.

use thiserror::Error;

/// Errors raised while assembling a scene or validating settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A shape (or its checker) references a material that does not exist.
    #[error("shape {shape} references material {material}, but only {available} are defined")]
    UnknownMaterial {
        /// Offending shape index.
        shape: usize,
        /// Material index referenced.
        material: usize,
        /// Number of materials in the scene.
        available: usize,
    },

    /// A disk normal, cylinder/cone axis or rectangle axis has zero length.
    #[error("shape {shape} ({kind}) has a zero-length axis or normal")]
    DegenerateAxis {
        /// Offending shape index.
        shape: usize,
        /// Primitive kind.
        kind: &'static str,
    },

    /// A coordinate of the shape is NaN or infinite.
    #[error("shape {shape} ({kind}) has non-finite coordinates")]
    NonFinite {
        /// Offending shape index.
        shape: usize,
        /// Primitive kind.
        kind: &'static str,
    },

    /// A material color is NaN or infinite.
    #[error("material {material} has a non-finite {field}")]
    NonFiniteMaterial {
        /// Offending material index.
        material: usize,
        /// Field name.
        field: &'static str,
    },

    /// A light position or intensity is NaN or infinite.
    #[error("light {light} has a non-finite {field}")]
    NonFiniteLight {
        /// Offending light index.
        light: usize,
        /// Field name.
        field: &'static str,
    },

    /// Trace or sensor settings are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
