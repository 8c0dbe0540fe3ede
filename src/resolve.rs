//! Input classification: web URL or local HTML file.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Filesystem existence probe, injectable so tests don't need real files.
pub trait FsProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> FsProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Returns true iff `input` is an absolute `http` or `https` URL.
pub fn classify(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Like [`classify`], treating a missing input as "not a URL".
pub fn classify_opt(input: Option<&str>) -> bool {
    input.map(classify).unwrap_or(false)
}

/// Turn the user's input into something the browser can navigate to.
///
/// URLs pass through untouched. Anything else is a path: it is made absolute,
/// checked with `probe`, and returned as a `file://` URI.
pub fn resolve(input: &str, probe: &impl FsProbe) -> Result<String> {
    if classify(input) {
        return Ok(input.to_string());
    }

    let path = absolute(Path::new(input))?;
    // An empty input names the working directory, which is never a page
    if input.is_empty() || !probe.exists(&path) {
        return Err(Error::FileNotFound(path));
    }

    let uri = Url::from_file_path(&path)
        .map_err(|_| Error::Other(format!("cannot build a file URI from {}", path.display())))?;
    log::debug!("resolved {} to {}", input, uri);
    Ok(uri.into())
}

/// `path` made absolute against the working directory; empty means the directory itself
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    let resolved = if path.as_os_str().is_empty() {
        std::env::current_dir()
    } else {
        std::path::absolute(path)
    };
    resolved.map_err(|e| Error::Other(format!("cannot resolve {}: {}", path.display(), e)))
}
