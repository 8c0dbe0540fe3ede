//! Scripted browser used by the pipeline tests

#![allow(dead_code)]

use html2slide::capture::{BrowserLauncher, BrowserSession, PageSession};
use html2slide::{Result, Viewport, WaitStrategy};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nscripted";

/// Everything the fake browser was asked to do
#[derive(Debug, Default)]
pub struct Recorded {
    pub launches: usize,
    pub closes: usize,
    pub viewports: Vec<Viewport>,
    pub navigations: Vec<(String, WaitStrategy, Duration)>,
    pub counted: Vec<String>,
    pub element_shots: Vec<String>,
    pub page_shots: Vec<bool>,
}

/// Launcher whose pages contain exactly the elements matched by `present`
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    pub recorded: Rc<RefCell<Recorded>>,
    pub present: Vec<String>,
}

impl ScriptedLauncher {
    pub fn with_elements(selectors: &[&str]) -> Self {
        Self {
            recorded: Rc::default(),
            present: selectors.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct ScriptedBrowser(ScriptedLauncher);
pub struct ScriptedPage(ScriptedLauncher);

impl BrowserLauncher for ScriptedLauncher {
    type Browser = ScriptedBrowser;

    fn launch(&self, _viewport: &Viewport) -> Result<ScriptedBrowser> {
        self.recorded.borrow_mut().launches += 1;
        Ok(ScriptedBrowser(self.clone()))
    }
}

impl BrowserSession for ScriptedBrowser {
    type Page = ScriptedPage;

    fn new_page(&mut self, viewport: &Viewport) -> Result<ScriptedPage> {
        self.0.recorded.borrow_mut().viewports.push(*viewport);
        Ok(ScriptedPage(self.0.clone()))
    }

    fn close(&mut self) -> Result<()> {
        self.0.recorded.borrow_mut().closes += 1;
        Ok(())
    }
}

impl PageSession for ScriptedPage {
    fn goto(&mut self, url: &str, wait: WaitStrategy, timeout: Duration) -> Result<()> {
        self.0
            .recorded
            .borrow_mut()
            .navigations
            .push((url.to_string(), wait, timeout));
        Ok(())
    }

    fn count(&mut self, selector: &str) -> Result<usize> {
        self.0.recorded.borrow_mut().counted.push(selector.to_string());
        Ok(self.0.present.iter().filter(|s| *s == selector).count())
    }

    fn screenshot_first(&mut self, selector: &str) -> Result<Vec<u8>> {
        self.0.recorded.borrow_mut().element_shots.push(selector.to_string());
        Ok(FAKE_PNG.to_vec())
    }

    fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>> {
        self.0.recorded.borrow_mut().page_shots.push(full_page);
        Ok(FAKE_PNG.to_vec())
    }
}
