//! Resolve → capture → package, strictly in that order.

use crate::capture::{self, BrowserLauncher};
use crate::cli::Options;
use crate::resolve::{self, FsProbe};
use crate::slides::{self, SlideFactory};
use crate::{PipelineResult, Result};
use log::info;

/// The three collaborators the pipeline needs, injected explicitly
pub struct Pipeline<L, S, P> {
    pub launcher: L,
    pub slides: S,
    pub probe: P,
}

impl<L, S, P> Pipeline<L, S, P>
where
    L: BrowserLauncher,
    S: SlideFactory,
    P: FsProbe,
{
    pub fn new(launcher: L, slides: S, probe: P) -> Self {
        Self {
            launcher,
            slides,
            probe,
        }
    }

    /// Run one conversion. Any stage failure aborts the rest; the
    /// intermediate image is left on disk when packaging fails.
    pub fn run(&self, options: &Options) -> Result<PipelineResult> {
        let page_reference = resolve::resolve(&options.input, &self.probe)?;

        let capture_request = options.capture_request(page_reference);
        capture::capture(&self.launcher, &capture_request)?;

        let packaging_request = options.packaging_request();
        slides::package(&self.slides, &packaging_request)?;

        let result = PipelineResult {
            final_slide_path: resolve::absolute(&packaging_request.output_slide_path)?,
            intermediate_image_path: resolve::absolute(&capture_request.output_image_path)?,
        };
        info!("wrote {}", result.final_slide_path.display());
        Ok(result)
    }
}

/// Headless Chrome, the built-in `.pptx` writer and the real filesystem
#[cfg(feature = "cdp")]
pub type ChromePipeline =
    Pipeline<crate::cdp::CdpLauncher, fn() -> crate::pptx::PptxDocument, resolve::RealFs>;

#[cfg(feature = "cdp")]
impl Default for ChromePipeline {
    fn default() -> Self {
        Pipeline::new(
            crate::cdp::CdpLauncher::default(),
            crate::pptx::PptxDocument::new as fn() -> _,
            resolve::RealFs,
        )
    }
}
