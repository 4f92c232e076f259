//! Bounded browser actions
//!
//! This crate is the boundary between the persona runner and the browser:
//! - `ActionPrimitives`: navigate, wait for visibility, click, drag, each with its own timeout
//! - `PageSource`: hands out one independent page per session
//! - `PagePrimitives` / `BrowserPages`: the Chromium-backed implementations over `cdp-adapter`

pub mod errors;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
