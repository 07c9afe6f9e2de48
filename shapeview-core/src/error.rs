/// Error type for the fallible edges of the core: files, parsing and config
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read resource {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OBJ parse error on line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("STL parse error: {0}")]
    StlParse(String),

    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
