//! # Browser Module
//!
//! The scriptable-browser capability consumed by the console authorizer.
//!
//! The consent flow only needs a handful of operations: open a URL, locate an
//! element, type into it, click it, read one of its attributes and scroll the
//! viewport. [`Browser`] is exactly that capability set, so the flow does not
//! depend on a particular browser engine. [`webdriver`] provides the
//! implementation used in production, speaking the W3C WebDriver protocol to
//! a `chromedriver` (or any compatible driver) over HTTP.

use std::fmt;

use async_trait::async_trait;

use crate::error::BrowserError;

pub mod webdriver;

pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// How to locate an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Id(String),
    Css(String),
}

impl Selector {
    pub fn id<S: Into<String>>(id: S) -> Self {
        Selector::Id(id.into())
    }

    pub fn css<S: Into<String>>(css: S) -> Self {
        Selector::Css(css.into())
    }

    /// The selector as a CSS expression.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Id(id) => format!("[id=\"{}\"]", id.replace('"', "\\\"")),
            Selector::Css(css) => css.clone(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{}", id),
            Selector::Css(css) => f.write_str(css),
        }
    }
}

/// Handle to an element found on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub selector: Selector,
    pub id: String,
}

/// A live, remote-controlled browser session.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), BrowserError>;

    /// Fails with [`BrowserError::NoSuchElement`] when nothing matches.
    async fn find(&self, selector: &Selector) -> Result<Element, BrowserError>;

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), BrowserError>;

    async fn click(&self, element: &Element) -> Result<(), BrowserError>;

    /// Reads an attribute of the element, `None` when it is unset.
    async fn attribute(&self, element: &Element, name: &str)
    -> Result<Option<String>, BrowserError>;

    async fn scroll_to(&self, y: u32) -> Result<(), BrowserError>;

    /// Ends the session. Further calls are invalid.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// Starts new browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Browser>, BrowserError>;
}
