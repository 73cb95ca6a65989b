//! Error types for PLY file operations.

use thiserror::Error;

/// Errors that can occur while reading a PLY mesh.
#[derive(Error, Debug)]
pub enum PlyError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or incomplete header.
    #[error("PLY header error at line {line}: {message}")]
    Header {
        /// Line number (1-indexed).
        line: usize,
        /// Error message.
        message: String,
    },

    /// Malformed element line after the header.
    #[error("PLY data error at line {line}: {message}")]
    Body {
        /// Line number (1-indexed).
        line: usize,
        /// Error message.
        message: String,
    },

    /// A face refers to a vertex that does not exist.
    #[error("face {face} uses vertex {index}, but the mesh has {vertices} vertices")]
    IndexOutOfRange {
        /// Face number (0-indexed).
        face: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices declared.
        vertices: usize,
    },

    /// A valid PLY feature this reader does not handle.
    #[error("unsupported PLY feature: {0}")]
    Unsupported(String),
}

impl PlyError {
    /// Create a header error.
    pub fn header(line: usize, message: impl Into<String>) -> Self {
        Self::Header {
            line,
            message: message.into(),
        }
    }

    /// Create a data error.
    pub fn body(line: usize, message: impl Into<String>) -> Self {
        Self::Body {
            line,
            message: message.into(),
        }
    }
}

/// Result type for PLY operations.
pub type Result<T> = std::result::Result<T, PlyError>;
