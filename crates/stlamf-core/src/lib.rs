pub mod amf;
pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod profile;
pub mod report;

pub use document::{build, Document, DocumentBuilder, Unit};
pub use error::{BuildError, ConfigError, ParseError, WriteError};
pub use mesh::{Mesh, MeshSource, Triangle};
