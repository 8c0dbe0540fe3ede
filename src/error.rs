//! Error types for the capture-and-package pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, capturing or packaging
#[derive(Error, Debug)]
pub enum Error {
    /// The local HTML input does not exist (carries the absolute path)
    #[error("HTML file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The selector matched zero elements on the loaded page
    #[error("Selector not found: {0}")]
    SelectorNotFound(String),

    /// Navigation did not reach the wait condition in time
    #[error("Navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    /// DNS or connection failure while navigating
    #[error("Network error: {0}")]
    Network(String),

    /// An output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    FilesystemWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required command-line argument was not provided
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// `--wait` got something other than one of the known strategies
    #[error("invalid wait strategy '{0}'")]
    InvalidWaitStrategy(String),

    /// Any other command-line problem
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Browser launch or protocol failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// The screenshot itself failed
    #[error("Screenshot failed: {0}")]
    Capture(String),

    /// Building the slide document failed
    #[error("Slide packaging failed: {0}")]
    Packaging(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FilesystemWrite {
            path: path.into(),
            source,
        }
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Browser(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Packaging(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Packaging(format!("XML error: {}", err))
    }
}
