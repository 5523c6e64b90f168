use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized STL format (as ASCII: {ascii}; as binary: {binary})")]
    UnrecognizedFormat {
        ascii: Box<ParseError>,
        binary: Box<ParseError>,
    },

    #[error("binary STL header truncated: need 84 bytes, file has {len}")]
    TruncatedHeader { len: usize },

    #[error(
        "binary STL truncated: header declares {declared} triangles, \
         only {complete} complete (record at byte {offset} is cut short)"
    )]
    TruncatedFile {
        declared: u32,
        complete: u32,
        offset: usize,
    },

    #[error("non-finite coordinate at byte {offset}")]
    NonFiniteCoordinate { offset: usize },

    #[error("malformed facet at line {line}: {reason}")]
    MalformedFacet { line: usize, reason: String },

    #[error("not valid UTF-8 text (first invalid byte at {offset})")]
    NotText { offset: usize },

    #[error("mesh contains no triangles")]
    EmptyMesh,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no input files given")]
    NoInputFiles,

    #[error("file {file:?} has no following profile token")]
    DanglingFileWithoutProfile { file: String },

    #[error("profile {profile:?} (requested for {file:?}) is not defined in the configuration")]
    UnknownProfile { profile: String, file: String },

    #[error("profile {profile:?} requested but no configuration file was given")]
    MissingConfig { profile: String },

    #[error("cannot read configuration {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration {path:?}: {message}")]
    Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no meshes to build a document from")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip container failed: {0}")]
    Archive(#[from] zip::result::ZipError),
}
