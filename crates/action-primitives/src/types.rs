//! Core data types for action primitives

use cdp_adapter::QuerySpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CSS selector used when an element is identified by its text alone.
const ANY_ELEMENT: &str = "body *";

/// Identifies a page control: a CSS selector, optionally narrowed by visible text.
///
/// Text matching is a case-insensitive substring test against the rendered text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    css: String,
    text: Option<String>,
}

impl Selector {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: None,
        }
    }

    /// Any element whose text contains `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::css(ANY_ELEMENT).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn to_query(&self) -> QuerySpec {
        QuerySpec {
            selector: self.css.clone(),
            text: self.text.clone(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.text, self.css.as_str()) {
            (Some(text), ANY_ELEMENT) => write!(f, "text='{}'", text),
            (Some(text), css) => write!(f, "{}:text('{}')", css, text),
            (None, css) => f.write_str(css),
        }
    }
}
