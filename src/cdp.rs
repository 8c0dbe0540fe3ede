//! Chrome DevTools Protocol backend for page capture

use crate::capture::{BrowserLauncher, BrowserSession, PageSession};
use crate::{Error, Result, Viewport, WaitStrategy};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often readiness conditions are re-evaluated
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Quiet period with no new resource entries that counts as network idle
const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Time given to the renderer to relayout after the viewport is resized
const RESIZE_SETTLE: Duration = Duration::from_millis(100);

/// Counts every resource fetch from document start. The resource timing
/// buffer stops at 250 entries, an observer does not.
const RESOURCE_COUNTER: &str = r#"(function() {
    window.__html2slideResources = 0;
    try {
        new PerformanceObserver(function(list) {
            window.__html2slideResources += list.getEntries().length;
        }).observe({ type: 'resource', buffered: true });
    } catch (e) {
        window.__html2slideResources = undefined;
    }
})();"#;

/// Launches a fresh headless Chrome per capture
#[derive(Debug, Clone)]
pub struct CdpLauncher {
    /// Turn off to watch the browser while debugging
    pub headless: bool,
}

impl Default for CdpLauncher {
    fn default() -> Self {
        Self { headless: true }
    }
}

impl BrowserLauncher for CdpLauncher {
    type Browser = CdpBrowser;

    fn launch(&self, viewport: &Viewport) -> Result<CdpBrowser> {
        let launch_options = LaunchOptions::default_builder()
            .headless(self.headless)
            .window_size(Some((viewport.width, viewport.height)))
            .build()
            .map_err(|e| Error::Browser(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Browser(format!("Failed to launch browser: {}", e)))?;

        Ok(CdpBrowser {
            browser: Some(browser),
        })
    }
}

/// A running Chrome process. Dropping the inner `Browser` kills it.
pub struct CdpBrowser {
    browser: Option<Browser>,
}

impl BrowserSession for CdpBrowser {
    type Page = CdpPage;

    fn new_page(&mut self, viewport: &Viewport) -> Result<CdpPage> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| Error::Browser("browser already closed".into()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Browser(format!("Failed to create tab: {}", e)))?;

        tab.call_method(Page::AddScriptToEvaluateOnNewDocument {
            source: RESOURCE_COUNTER.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })
        .map_err(|e| Error::Browser(format!("Failed to install resource counter: {}", e)))?;

        let page = CdpPage {
            tab,
            viewport: *viewport,
        };
        page.emulate(viewport.width, viewport.height)?;
        Ok(page)
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the browser terminates the child process.
        drop(self.browser.take());
        Ok(())
    }
}

/// A single tab holding the page being captured
pub struct CdpPage {
    tab: Arc<Tab>,
    viewport: Viewport,
}

#[derive(Debug, Deserialize)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: Option<usize>,
    error: Option<String>,
}

impl CdpPage {
    /// Evaluate an expression that returns `JSON.stringify(...)` and decode it
    fn eval_json<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let eval = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| Error::Browser(format!("Evaluation failed: {}", e)))?;

        let text = match eval.value {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => return Err(Error::Browser("No value returned from evaluation".into())),
        };

        serde_json::from_str(&text)
            .map_err(|e| Error::Browser(format!("Unexpected evaluation result {}: {}", text, e)))
    }

    fn ready_state(&self) -> Result<String> {
        self.eval_json("JSON.stringify(document.readyState)")
    }

    /// Resource fetches seen since the current document started
    pub fn resource_count(&self) -> Result<usize> {
        self.eval_json(
            r#"JSON.stringify(typeof window.__html2slideResources === 'number'
                ? window.__html2slideResources
                : performance.getEntriesByType('resource').length)"#,
        )
    }

    /// `window.devicePixelRatio` as the page sees it
    pub fn device_pixel_ratio(&self) -> Result<f64> {
        self.eval_json("JSON.stringify(window.devicePixelRatio)")
    }

    /// Poll `done` until it reports true or `deadline` passes
    fn poll_until<F>(&self, deadline: Instant, timeout: Duration, mut done: F) -> Result<()>
    where
        F: FnMut(&Self) -> Result<bool>,
    {
        loop {
            if done(self)? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::NavigationTimeout(timeout.as_millis() as u64));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn wait_network_idle(&self, deadline: Instant, timeout: Duration) -> Result<()> {
        let mut last = self.resource_count()?;
        let mut quiet_since = Instant::now();
        self.poll_until(deadline, timeout, |page| {
            let now = page.resource_count()?;
            if now != last {
                last = now;
                quiet_since = Instant::now();
            }
            Ok(quiet_since.elapsed() >= NETWORK_IDLE_WINDOW)
        })
    }

    /// Set the CSS viewport and the device scale factor the page renders at
    fn emulate(&self, width: u32, height: u32) -> Result<()> {
        self.tab
            .call_method(Emulation::SetDeviceMetricsOverride {
                width,
                height,
                device_scale_factor: self.viewport.scale_factor,
                mobile: false,
                scale: None,
                screen_width: None,
                screen_height: None,
                position_x: None,
                position_y: None,
                dont_set_visible_size: None,
                screen_orientation: None,
                viewport: None,
                display_feature: None,
                device_posture: None,
            })
            .map_err(|e| Error::Browser(format!("Failed to set device metrics: {}", e)))?;
        Ok(())
    }

    /// Grow the viewport so `rect` is fully painted, then capture it
    fn capture_rect(&self, rect: &Rect) -> Result<Vec<u8>> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(Error::Capture("element has an empty bounding box".into()));
        }

        let need_w = (rect.x + rect.width).ceil() as u32;
        let need_h = (rect.y + rect.height).ceil() as u32;
        if need_w > self.viewport.width || need_h > self.viewport.height {
            self.emulate(need_w.max(self.viewport.width), need_h.max(self.viewport.height))?;
            std::thread::sleep(RESIZE_SETTLE);
        }

        // Pixel density already comes from the emulated scale factor
        let clip = Page::Viewport {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            scale: 1.0,
        };

        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::Capture(e.to_string()))
    }
}

/// Map a navigation failure from `headless_chrome` onto the pipeline taxonomy
fn navigation_error(err: anyhow::Error, timeout: Duration) -> Error {
    let msg = err.to_string();
    if msg.contains("net::ERR_") {
        Error::Network(msg)
    } else if msg.contains("never came") || msg.to_lowercase().contains("timeout") {
        Error::NavigationTimeout(timeout.as_millis() as u64)
    } else {
        Error::Browser(format!("Navigation failed: {}", msg))
    }
}

/// JSON string literal for embedding a user value in a script
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl PageSession for CdpPage {
    fn goto(&mut self, url: &str, wait: WaitStrategy, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .map_err(|e| navigation_error(e, timeout))?;

        if wait == WaitStrategy::Commit {
            return Ok(());
        }

        self.tab
            .wait_until_navigated()
            .map_err(|e| navigation_error(e, timeout))?;

        match wait {
            WaitStrategy::DomContentLoaded => self.poll_until(deadline, timeout, |page| {
                let state = page.ready_state()?;
                Ok(state == "interactive" || state == "complete")
            })?,
            WaitStrategy::Load => {
                self.poll_until(deadline, timeout, |page| Ok(page.ready_state()? == "complete"))?
            }
            WaitStrategy::NetworkIdle => {
                self.poll_until(deadline, timeout, |page| Ok(page.ready_state()? == "complete"))?;
                self.wait_network_idle(deadline, timeout)?;
            }
            WaitStrategy::Commit => {}
        }

        debug!("navigated to {} ({})", url, wait);
        Ok(())
    }

    fn count(&mut self, selector: &str) -> Result<usize> {
        let script = format!(
            r#"(function() {{
                try {{
                    return JSON.stringify({{ count: document.querySelectorAll({sel}).length }});
                }} catch (e) {{
                    return JSON.stringify({{ error: String(e) }});
                }}
            }})()"#,
            sel = js_string(selector)
        );

        let res: CountResult = self.eval_json(&script)?;
        match (res.count, res.error) {
            (Some(n), _) => Ok(n),
            (None, Some(e)) => Err(Error::Argument(format!("invalid selector {}: {}", selector, e))),
            (None, None) => Err(Error::Browser("selector count returned nothing".into())),
        }
    }

    fn screenshot_first(&mut self, selector: &str) -> Result<Vec<u8>> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                el.scrollIntoView({{ block: 'start', inline: 'start' }});
                const r = el.getBoundingClientRect();
                return JSON.stringify({{
                    x: r.left + window.scrollX,
                    y: r.top + window.scrollY,
                    width: r.width,
                    height: r.height
                }});
            }})()"#,
            sel = js_string(selector)
        );

        let rect: Rect = self.eval_json(&script)?;
        debug!("element {} at {:?}", selector, rect);
        self.capture_rect(&rect)
    }

    fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>> {
        let rect = if full_page {
            self.eval_json(
                r#"(function() {
                    window.scrollTo(0, 0);
                    const d = document.documentElement;
                    const b = document.body || d;
                    return JSON.stringify({
                        x: 0,
                        y: 0,
                        width: Math.max(d.scrollWidth, b.scrollWidth, d.clientWidth),
                        height: Math.max(d.scrollHeight, b.scrollHeight, d.clientHeight)
                    });
                })()"#,
            )?
        } else {
            Rect {
                x: 0.0,
                y: 0.0,
                width: self.viewport.width as f64,
                height: self.viewport.height as f64,
            }
        };

        self.capture_rect(&rect)
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            warn!("Failed to close tab: {}", e);
        }
    }
}
