//! Command-line surface and the requests derived from it

use crate::{CaptureRequest, Error, PackagingRequest, Result, Viewport, WaitStrategy};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Render an HTML file or URL into a single-slide PowerPoint file
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "html2slide", version, about)]
pub struct Options {
    /// HTML file path or http(s):// URL
    pub input: String,

    /// Output slide file
    #[arg(short, long, default_value = "slide.pptx")]
    pub out: PathBuf,

    /// Intermediate PNG path (default: --out with a .png extension)
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// CSS selector of the element to capture (empty = full page)
    #[arg(long, default_value = "")]
    pub selector: String,

    /// Viewport width in pixels
    #[arg(long, default_value_t = Viewport::DEFAULT.width, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = Viewport::DEFAULT.height, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Device pixel ratio used for the capture
    #[arg(long, default_value_t = Viewport::DEFAULT.scale_factor, value_parser = positive_f64)]
    pub scale: f64,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = CaptureRequest::DEFAULT_TIMEOUT_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// When navigation counts as done: load, domcontentloaded, networkidle, commit
    #[arg(long, default_value_t = WaitStrategy::default(), value_parser = parse_wait)]
    pub wait: WaitStrategy,

    /// Pause after navigation, in milliseconds, before taking the screenshot
    #[arg(long, default_value_t = CaptureRequest::DEFAULT_SETTLE_MS)]
    pub settle: u64,

    /// Keep the document's default 10 x 5.625 in canvas instead of 13.333 x 7.5
    #[arg(long)]
    pub no_widescreen: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What the command line asked for
#[derive(Debug)]
pub enum Parsed {
    /// Run the pipeline
    Run(Box<Options>),
    /// Help or version text; print it and exit successfully
    Display(clap::Error),
}

fn parse_wait(value: &str) -> std::result::Result<WaitStrategy, String> {
    value.parse::<WaitStrategy>().map_err(|e| e.to_string())
}

fn positive_f64(value: &str) -> std::result::Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err("must be a positive number".into()),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse arguments (including the program name) into a [`Parsed`]
pub fn parse_from<I, T>(args: I) -> Result<Parsed>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Options::try_parse_from(args) {
        Ok(options) => Ok(Parsed::Run(Box::new(options))),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Ok(Parsed::Display(e)),
            _ => Err(argument_error(&e)),
        },
    }
}

fn context_string(e: &clap::Error, kind: ContextKind) -> Option<String> {
    match e.get(kind)? {
        ContextValue::String(s) => Some(s.clone()),
        ContextValue::Strings(v) => Some(v.join(", ")),
        _ => None,
    }
}

fn argument_error(e: &clap::Error) -> Error {
    match e.kind() {
        ErrorKind::MissingRequiredArgument => {
            let name = context_string(e, ContextKind::InvalidArg)
                .map(|s| s.trim_matches(|c| c == '<' || c == '>').to_lowercase())
                .unwrap_or_else(|| "input".to_string());
            Error::MissingArgument(name)
        }
        ErrorKind::ValueValidation | ErrorKind::InvalidValue
            if context_string(e, ContextKind::InvalidArg)
                .is_some_and(|arg| arg.starts_with("--wait")) =>
        {
            let value = context_string(e, ContextKind::InvalidValue).unwrap_or_default();
            Error::InvalidWaitStrategy(value)
        }
        _ => {
            let rendered = e.to_string();
            let first = rendered.lines().next().unwrap_or("").trim();
            Error::Argument(first.trim_start_matches("error: ").to_string())
        }
    }
}

/// `None` for empty or all-whitespace selectors, the trimmed selector otherwise
pub fn normalize_selector(selector: &str) -> Option<String> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Options {
    /// Options for `input` with every other flag at its default
    pub fn new(input: impl Into<String>) -> Self {
        // The input is set afterwards so values starting with '-' stay literal
        let mut options = Self::parse_from(["html2slide", "page.html"]);
        options.input = input.into();
        options
    }

    /// `--png`, or `--out` with its extension swapped for `png`
    pub fn image_path(&self) -> PathBuf {
        self.png
            .clone()
            .unwrap_or_else(|| self.out.with_extension("png"))
    }

    pub fn capture_request(&self, page_reference: String) -> CaptureRequest {
        CaptureRequest {
            page_reference,
            output_image_path: self.image_path(),
            element_selector: normalize_selector(&self.selector),
            viewport: Viewport {
                width: self.width,
                height: self.height,
                scale_factor: self.scale,
            },
            navigation_timeout: Duration::from_millis(self.timeout),
            wait_strategy: self.wait,
            settle_delay: Duration::from_millis(self.settle),
        }
    }

    pub fn packaging_request(&self) -> PackagingRequest {
        PackagingRequest {
            source_image_path: self.image_path(),
            output_slide_path: self.out.clone(),
            use_widescreen_layout: !self.no_widescreen,
        }
    }

    /// Log filter implied by `-v`
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}
