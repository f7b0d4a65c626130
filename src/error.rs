use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the library can surface. Each operation is a single
/// transaction, so errors are reported once and never retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed schema at line {line}: {reason}")]
    MalformedSchema { line: usize, reason: String },

    #[error("directory {} does not exist or is not writable", .0.display())]
    PathNotWritable(PathBuf),

    #[error("no unit file found for service '{0}'")]
    ServiceNotFound(String),

    #[error("{} already exists; edit or delete it instead", .0.display())]
    AlreadyExists(PathBuf),

    #[error("service name {0:?} contains characters that are not allowed")]
    InvalidServiceName(String),

    #[error("aborted by operator")]
    Aborted,

    #[error("prompt failed")]
    Prompt(#[source] anyhow::Error),

    #[error("editor failed")]
    Editor(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
