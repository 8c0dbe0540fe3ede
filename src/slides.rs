//! Slide Packager: one image, one slide, one file.

use crate::{PackagingRequest, Result};
use log::info;
use std::path::{Path, PathBuf};

/// A named canvas size in inches
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

pub const WIDESCREEN_NAME: &str = "WIDESCREEN";
pub const WIDESCREEN_WIDTH: f64 = 13.333;
pub const WIDESCREEN_HEIGHT: f64 = 7.5;

impl Layout {
    /// 13.333 x 7.5 in, 16:9
    pub fn widescreen() -> Self {
        Self {
            name: WIDESCREEN_NAME.to_string(),
            width: WIDESCREEN_WIDTH,
            height: WIDESCREEN_HEIGHT,
        }
    }
}

/// Index of a slide within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideId(pub usize);

/// Where an image sits on a slide, in inches from the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub path: PathBuf,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A presentation under construction
pub trait SlideDocument {
    /// Register a custom canvas that can later be selected by name
    fn define_layout(&mut self, layout: Layout);

    /// Select the active canvas. Fails on names that were never defined.
    fn set_layout(&mut self, name: &str) -> Result<()>;

    /// Width and height of the active canvas in inches
    fn canvas_size(&self) -> (f64, f64);

    fn add_slide(&mut self) -> SlideId;

    fn add_image(&mut self, slide: SlideId, image: ImagePlacement) -> Result<()>;

    /// Serialize the document to `path`
    fn write_file(&mut self, path: &Path) -> Result<()>;
}

/// Builds a fresh document for each packaging call
pub trait SlideFactory {
    type Document: SlideDocument;

    fn create(&self) -> Self::Document;
}

impl<F, D> SlideFactory for F
where
    F: Fn() -> D,
    D: SlideDocument,
{
    type Document = D;

    fn create(&self) -> D {
        self()
    }
}

/// Write `request.source_image_path` as the only content of a new slide file.
///
/// The image is stretched over the whole canvas; differing aspect ratios are
/// not corrected.
pub fn package<F: SlideFactory>(factory: &F, request: &PackagingRequest) -> Result<()> {
    let mut doc = factory.create();

    let (width, height) = if request.use_widescreen_layout {
        let layout = Layout::widescreen();
        let size = (layout.width, layout.height);
        doc.define_layout(layout);
        doc.set_layout(WIDESCREEN_NAME)?;
        size
    } else {
        doc.canvas_size()
    };

    let slide = doc.add_slide();
    doc.add_image(
        slide,
        ImagePlacement {
            path: request.source_image_path.clone(),
            x: 0.0,
            y: 0.0,
            w: width,
            h: height,
        },
    )?;
    doc.write_file(&request.output_slide_path)?;

    info!(
        "packaged {} into {} ({}x{} in)",
        request.source_image_path.display(),
        request.output_slide_path.display(),
        width,
        height
    );
    Ok(())
}
