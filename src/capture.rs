//! Page Capture: load a page in a browser and screenshot it to a PNG file.
//!
//! The browser is reached through three small traits so the capture
//! algorithm can run against a fake in tests. The production implementation
//! lives in [`crate::cdp`].

use crate::{CaptureRequest, Error, Result, Viewport, WaitStrategy};
use log::{debug, info, warn};
use std::path::Path;
use std::time::Duration;

/// Starts a fresh browser process
pub trait BrowserLauncher {
    type Browser: BrowserSession;

    fn launch(&self, viewport: &Viewport) -> Result<Self::Browser>;
}

/// A running browser. Owned by exactly one `capture` call.
pub trait BrowserSession {
    type Page: PageSession;

    /// Open a page configured with the viewport size and scale factor
    fn new_page(&mut self, viewport: &Viewport) -> Result<Self::Page>;

    /// Shut the browser down. Called exactly once per session.
    fn close(&mut self) -> Result<()>;
}

/// A page inside a running browser
pub trait PageSession {
    /// Navigate and block until `wait` is satisfied or `timeout` elapses
    fn goto(&mut self, url: &str, wait: WaitStrategy, timeout: Duration) -> Result<()>;

    /// Number of elements matching `selector`
    fn count(&mut self, selector: &str) -> Result<usize>;

    /// PNG of the first element matching `selector`
    fn screenshot_first(&mut self, selector: &str) -> Result<Vec<u8>>;

    /// PNG of the viewport, or of the whole scrollable page when `full_page`
    fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>>;
}

/// Closes the wrapped browser when dropped unless [`SessionGuard::close`]
/// already did.
pub struct SessionGuard<B: BrowserSession> {
    inner: Option<B>,
}

impl<B: BrowserSession> SessionGuard<B> {
    pub fn new(browser: B) -> Self {
        Self {
            inner: Some(browser),
        }
    }

    fn browser(&mut self) -> Result<&mut B> {
        self.inner
            .as_mut()
            .ok_or_else(|| Error::Browser("browser already closed".into()))
    }

    /// Close now and surface the close error
    pub fn close(mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut b) => b.close(),
            None => Ok(()),
        }
    }
}

impl<B: BrowserSession> Drop for SessionGuard<B> {
    fn drop(&mut self) {
        if let Some(mut b) = self.inner.take() {
            if let Err(e) = b.close() {
                warn!("Failed to close browser: {}", e);
            }
        }
    }
}

/// Capture `request.page_reference` into `request.output_image_path`.
///
/// The browser is closed before this returns, whether or not the capture
/// succeeded. On failure no image file is written.
pub fn capture<L: BrowserLauncher>(launcher: &L, request: &CaptureRequest) -> Result<()> {
    debug!("launching browser for {}", request.page_reference);
    let mut guard = SessionGuard::new(launcher.launch(&request.viewport)?);

    let shot = capture_with(guard.browser()?, request);
    // On error the guard's Drop closes the browser; the capture error wins.
    let png = shot?;
    guard.close()?;

    write_image(&request.output_image_path, &png)?;
    info!(
        "captured {} ({} bytes) to {}",
        request.page_reference,
        png.len(),
        request.output_image_path.display()
    );
    Ok(())
}

fn capture_with<B: BrowserSession>(browser: &mut B, request: &CaptureRequest) -> Result<Vec<u8>> {
    let mut page = browser.new_page(&request.viewport)?;

    page.goto(
        &request.page_reference,
        request.wait_strategy,
        request.navigation_timeout,
    )?;

    if !request.settle_delay.is_zero() {
        std::thread::sleep(request.settle_delay);
    }

    match request.element_selector.as_deref() {
        Some(selector) => {
            if page.count(selector)? == 0 {
                return Err(Error::SelectorNotFound(selector.to_string()));
            }
            debug!("capturing first match of {}", selector);
            page.screenshot_first(selector)
        }
        None => {
            debug!("capturing full page");
            page.screenshot(true)
        }
    }
}

fn write_image(path: &Path, png: &[u8]) -> Result<()> {
    std::fs::write(path, png).map_err(|e| Error::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        closes: usize,
    }

    struct FakeLauncher {
        log: Rc<RefCell<Log>>,
        matches: usize,
        goto_error: Option<fn() -> Error>,
    }

    struct FakeBrowser {
        log: Rc<RefCell<Log>>,
        matches: usize,
        goto_error: Option<fn() -> Error>,
    }

    struct FakePage {
        log: Rc<RefCell<Log>>,
        matches: usize,
        goto_error: Option<fn() -> Error>,
    }

    impl FakeLauncher {
        fn new(matches: usize) -> Self {
            Self {
                log: Rc::default(),
                matches,
                goto_error: None,
            }
        }
    }

    impl BrowserLauncher for FakeLauncher {
        type Browser = FakeBrowser;

        fn launch(&self, _viewport: &Viewport) -> Result<FakeBrowser> {
            self.log.borrow_mut().calls.push("launch".into());
            Ok(FakeBrowser {
                log: self.log.clone(),
                matches: self.matches,
                goto_error: self.goto_error,
            })
        }
    }

    impl BrowserSession for FakeBrowser {
        type Page = FakePage;

        fn new_page(&mut self, viewport: &Viewport) -> Result<FakePage> {
            self.log
                .borrow_mut()
                .calls
                .push(format!("new_page {}x{}@{}", viewport.width, viewport.height, viewport.scale_factor));
            Ok(FakePage {
                log: self.log.clone(),
                matches: self.matches,
                goto_error: self.goto_error,
            })
        }

        fn close(&mut self) -> Result<()> {
            self.log.borrow_mut().closes += 1;
            Ok(())
        }
    }

    impl PageSession for FakePage {
        fn goto(&mut self, url: &str, wait: WaitStrategy, timeout: Duration) -> Result<()> {
            self.log
                .borrow_mut()
                .calls
                .push(format!("goto {} {} {}", url, wait, timeout.as_millis()));
            match self.goto_error {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }

        fn count(&mut self, selector: &str) -> Result<usize> {
            self.log.borrow_mut().calls.push(format!("count {}", selector));
            Ok(self.matches)
        }

        fn screenshot_first(&mut self, selector: &str) -> Result<Vec<u8>> {
            self.log.borrow_mut().calls.push(format!("screenshot_first {}", selector));
            Ok(b"\x89PNGelement".to_vec())
        }

        fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>> {
            self.log.borrow_mut().calls.push(format!("screenshot full_page={}", full_page));
            Ok(b"\x89PNGpage".to_vec())
        }
    }

    fn request(dir: &Path, selector: Option<&str>) -> CaptureRequest {
        CaptureRequest {
            page_reference: "https://example.com".into(),
            output_image_path: dir.join("out.png"),
            element_selector: selector.map(String::from),
            settle_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn full_page_capture_skips_selector_matching() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(0);
        capture(&launcher, &request(dir.path(), None)).unwrap();

        let log = launcher.log.borrow();
        assert_eq!(
            log.calls,
            vec![
                "launch",
                "new_page 960x540@2",
                "goto https://example.com networkidle 30000",
                "screenshot full_page=true",
            ]
        );
        assert_eq!(log.closes, 1);
        assert_eq!(std::fs::read(dir.path().join("out.png")).unwrap(), b"\x89PNGpage");
    }

    #[test]
    fn element_capture_uses_first_match() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(3);
        capture(&launcher, &request(dir.path(), Some("#chart"))).unwrap();

        let log = launcher.log.borrow();
        assert!(log.calls.contains(&"screenshot_first #chart".to_string()));
        assert!(!log.calls.iter().any(|c| c.starts_with("screenshot full_page")));
        assert_eq!(log.closes, 1);
    }

    #[test]
    fn zero_matches_fails_and_still_closes_once() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(0);
        let err = capture(&launcher, &request(dir.path(), Some(".notfound"))).unwrap_err();

        assert!(matches!(err, Error::SelectorNotFound(ref s) if s == ".notfound"));
        assert_eq!(launcher.log.borrow().closes, 1);
        assert!(!dir.path().join("out.png").exists());
    }

    #[test]
    fn navigation_failure_closes_browser() {
        let dir = tempfile::tempdir().unwrap();
        let mut launcher = FakeLauncher::new(1);
        launcher.goto_error = Some(|| Error::NavigationTimeout(30000));
        let err = capture(&launcher, &request(dir.path(), None)).unwrap_err();

        assert!(matches!(err, Error::NavigationTimeout(30000)));
        let log = launcher.log.borrow();
        assert_eq!(log.closes, 1);
        assert!(!log.calls.iter().any(|c| c.starts_with("screenshot")));
    }

    #[test]
    fn unwritable_output_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = FakeLauncher::new(0);
        let mut req = request(dir.path(), None);
        req.output_image_path = dir.path().join("no-such-dir").join("out.png");

        let err = capture(&launcher, &req).unwrap_err();
        assert!(matches!(err, Error::FilesystemWrite { .. }));
        assert_eq!(launcher.log.borrow().closes, 1);
    }
}
