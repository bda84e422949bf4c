use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Bad magic")]
    BadMagic,

    #[error("Truncated section 0x{tag:02x}: declared {declared} bytes, {remaining} remaining")]
    TruncatedSection { tag: u8, declared: u32, remaining: usize },

    #[error("Invalid numerus rules")]
    InvalidPluralRules,

    #[error("Corrupt dependency list")]
    CorruptDependencyList,

    #[error("Dependency {name:?} failed to load: {source}")]
    DependencyLoadFailed {
        name: String,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Cyclic dependency on {0}")]
    CyclicDependency(PathBuf),

    #[error("No readable catalog for {0:?}")]
    NotFound(String),

    #[error("Read of {wanted} bytes at offset {offset} exceeds buffer of {len}")]
    OutOfBounds { offset: usize, wanted: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
