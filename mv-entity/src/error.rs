use std::path::PathBuf;

use thiserror::Error;

/// Defects in static model data. A model carrying any of these is rejected as
/// a whole; no partial geometry is ever built from it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedModelError {
    #[error("model declares no bones")]
    EmptyModel,
    #[error("bone `{bone}` is declared more than once")]
    DuplicateBone { bone: String },
    #[error("bone `{bone}` references unknown parent `{parent}`")]
    UnknownParent { bone: String, parent: String },
    #[error("bone `{bone}` is its own ancestor")]
    Cycle { bone: String },
    #[error("cube #{index} of bone `{bone}` has an invalid size or origin")]
    InvalidCube { bone: String, index: usize },
    #[error("atlas size {width}x{height} is invalid")]
    InvalidAtlas { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown entity type `{entity_type}`")]
    ModelNotFound { entity_type: String },
    #[error("entity type `{entity_type}` part `{part}` is malformed: {source}")]
    Malformed {
        entity_type: String,
        part: String,
        #[source]
        source: MalformedModelError,
    },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("entity type `{entity_type}` is not a valid definition: {source}")]
    InvalidEntry {
        entity_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("entity type `{entity_type}` part `{part}` is malformed: {source}")]
    Malformed {
        entity_type: String,
        part: String,
        #[source]
        source: MalformedModelError,
    },
}
