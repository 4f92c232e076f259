//! Command parameter types exposed by the CDP adapter interface.

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, AdapterErrorKind};

/// Specification for a DOM query operation.
///
/// `selector` is a CSS selector. When `text` is present only elements whose rendered text
/// contains it (case-insensitive) are kept, innermost matches first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub selector: String,
    pub text: Option<String>,
}

impl QuerySpec {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Build the `Runtime.evaluate` expression that resolves this query to anchors.
    pub fn to_expression(&self) -> Result<String, AdapterError> {
        let selector_literal = serde_json::to_string(&self.selector).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal).with_hint(err.to_string())
        })?;
        let text_literal = match &self.text {
            Some(text) => serde_json::to_string(&text.to_lowercase()).map_err(|err| {
                AdapterError::new(AdapterErrorKind::Internal).with_hint(err.to_string())
            })?,
            None => "null".to_string(),
        };

        Ok(format!(
            "(() => {{\n    const needle = {text};\n    let elements;\n    try {{\n        elements = Array.from(document.querySelectorAll({selector}));\n    }} catch (err) {{\n        return [];\n    }}\n    const textOf = (el) => (el.innerText || el.textContent || '').toLowerCase();\n    if (needle !== null) {{\n        elements = elements.filter((el) => textOf(el).includes(needle));\n        elements = elements.filter((el) => !elements.some((other) => other !== el && el.contains(other)));\n    }}\n    return elements.map((el) => {{\n        const rect = el.getBoundingClientRect();\n        const style = window.getComputedStyle(el);\n        const visible = rect.width > 0 && rect.height > 0\n            && style.visibility !== 'hidden' && style.display !== 'none'\n            && Number(style.opacity || '1') > 0;\n        return {{\n            x: Number.isFinite(rect.left) ? rect.left + rect.width / 2 : 0,\n            y: Number.isFinite(rect.top) ? rect.top + rect.height / 2 : 0,\n            visible\n        }};\n    }});\n}})()",
            text = text_literal,
            selector = selector_literal
        ))
    }
}

/// Center point of a matched element plus its visibility at query time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

/// Raw mouse input dispatched through `Input.dispatchMouseEvent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseAction {
    Move,
    Press,
    Release,
}

/// Evenly spaced points strictly between `from` and `to`, ending on `to`.
pub fn drag_path(from: &Anchor, to: &Anchor, steps: u32) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (1..=steps)
        .map(|step| {
            let t = step as f64 / steps as f64;
            (from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
        })
        .collect()
}
