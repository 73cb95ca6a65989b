#![warn(missing_docs)]

//! ASCII PLY mesh import for gridtrace.
//!
//! Reads the vertex and face elements of a `format ascii 1.0` file and
//! returns the faces as triangles, fan-triangulating polygons. Other
//! elements and properties are parsed past and ignored.
//!
//! # Example
//!
//! ```ignore
//! use gridtrace_ply::{read_ply, MeshPlacement};
//!
//! let placement = MeshPlacement {
//!     normalize: true,
//!     scale: 1024.0,
//!     ..MeshPlacement::default()
//! };
//! let triangles = read_ply("bunny.ply", &placement)?;
//! ```

pub mod error;
mod reader;

pub use error::{PlyError, Result};
pub use reader::{read_ply, read_ply_from_str, MeshPlacement};
