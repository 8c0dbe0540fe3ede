//! html2slide
//!
//! Render an HTML page (or one element of it) with headless Chrome and wrap
//! the resulting PNG into a single-slide PowerPoint file.
//!
//! # Pipeline
//!
//! - **Resolve**: classify the input as a URL or a local file ([`resolve`])
//! - **Capture**: drive a browser to screenshot the page ([`capture`])
//! - **Package**: place the image full-bleed on one slide ([`slides`], [`pptx`])
//! - **Translate**: turn failures into one readable line ([`translate`])
//!
//! Every collaborator (browser, slide writer, filesystem probe) sits behind a
//! trait so the sequencing in [`pipeline`] can be exercised without Chrome.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = html2slide::cli::Options::new("https://example.com");
//! let result = html2slide::ChromePipeline::default().run(&options)?;
//! println!("OK: {}", result.final_slide_path.display());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cdp"))]
//! # fn main() {}
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod cli;
pub mod pipeline;
pub mod pptx;
pub mod resolve;
pub mod slides;
pub mod translate;

// Chrome DevTools Protocol backend for page capture
#[cfg(feature = "cdp")]
pub mod cdp;

pub use pipeline::Pipeline;
#[cfg(feature = "cdp")]
pub use pipeline::ChromePipeline;
pub use translate::translate;

/// Viewport used for capture
///
/// `scale_factor` is the device pixel ratio: a 960x540 viewport at scale 2
/// produces a 1920x1080 image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub const DEFAULT: Viewport = Viewport {
        width: 960,
        height: 540,
        scale_factor: 2.0,
    };
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// When navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// The `load` event fired
    Load,
    /// The `DOMContentLoaded` event fired
    DomContentLoaded,
    /// Loaded, and no new network requests for 500ms
    #[default]
    NetworkIdle,
    /// The navigation was committed; nothing else is awaited
    Commit,
}

impl WaitStrategy {
    pub const ALL: [WaitStrategy; 4] = [
        WaitStrategy::Load,
        WaitStrategy::DomContentLoaded,
        WaitStrategy::NetworkIdle,
        WaitStrategy::Commit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaitStrategy::Load => "load",
            WaitStrategy::DomContentLoaded => "domcontentloaded",
            WaitStrategy::NetworkIdle => "networkidle",
            WaitStrategy::Commit => "commit",
        }
    }
}

impl fmt::Display for WaitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        WaitStrategy::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| Error::InvalidWaitStrategy(s.to_string()))
    }
}

/// Everything Page Capture needs for one screenshot
///
/// Built once per invocation from the command line and consumed by
/// [`capture::capture`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// URL or `file://` URI to navigate to
    pub page_reference: String,
    /// Where the PNG is written
    pub output_image_path: PathBuf,
    /// Restrict the capture to the first element matching this CSS selector.
    /// Never `Some("")`: blank selectors are normalized to `None`.
    pub element_selector: Option<String>,
    pub viewport: Viewport,
    pub navigation_timeout: Duration,
    pub wait_strategy: WaitStrategy,
    /// Pause after navigation for late fonts and async layout
    pub settle_delay: Duration,
}

impl CaptureRequest {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_SETTLE_MS: u64 = 800;
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            page_reference: String::new(),
            output_image_path: PathBuf::from("slide.png"),
            element_selector: None,
            viewport: Viewport::default(),
            navigation_timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            wait_strategy: WaitStrategy::default(),
            settle_delay: Duration::from_millis(Self::DEFAULT_SETTLE_MS),
        }
    }
}

/// Input for the Slide Packager
#[derive(Debug, Clone, PartialEq)]
pub struct PackagingRequest {
    /// An image produced by a prior successful capture
    pub source_image_path: PathBuf,
    pub output_slide_path: PathBuf,
    pub use_widescreen_layout: bool,
}

/// Produced only when every stage succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub final_slide_path: PathBuf,
    pub intermediate_image_path: PathBuf,
}
