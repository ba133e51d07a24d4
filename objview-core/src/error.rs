/// Errors produced while loading geometry and material files
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// A geometry or material-library file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A group selected a material before any `mtllib` line was seen
    #[error("group `{group}` uses material `{material}` but no material library was declared")]
    MissingMaterialLibrary { group: String, material: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
