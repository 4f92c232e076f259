//! Action primitives implementation
//!
//! Four bounded primitives for driving a page:
//! 1. navigate - Load a URL within a deadline
//! 2. wait_visible - Poll until a control is visible
//! 3. click - Wait for a control, then click its center
//! 4. drag_to - Drag one visible control onto another

mod click;
mod drag;
mod navigate;

pub use click::*;
pub use drag::*;
pub use navigate::*;

use async_trait::async_trait;
use cdp_adapter::{CdpAdapter, PageHandle};
use std::sync::Arc;
use std::time::Duration;

use crate::{errors::ActionError, types::Selector, waiting::VisibilityWait};

/// Action primitives trait
///
/// The capability set a persona session needs from its environment. Each call carries its
/// own timeout; exceeding it yields `ActionError::WaitTimeout` or `NavTimeout`.
#[async_trait]
pub trait ActionPrimitives: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ActionError>;

    /// Wait until the control is visible
    async fn wait_visible(&self, target: &Selector, timeout: Duration)
        -> Result<(), ActionError>;

    /// Click a control
    async fn click(&self, target: &Selector, timeout: Duration) -> Result<(), ActionError>;

    /// Drag `source` onto `target`
    async fn drag_to(
        &self,
        source: &Selector,
        target: &Selector,
        timeout: Duration,
    ) -> Result<(), ActionError>;

    /// URL currently displayed, if the environment knows it
    async fn current_url(&self) -> Option<String>;

    /// Release the environment
    async fn close(&self) -> Result<(), ActionError>;
}

/// Hands out one independent environment per session.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn ActionPrimitives>, ActionError>;

    /// Release everything the source still holds
    async fn shutdown(&self) -> Result<(), ActionError>;
}

/// Chromium-backed primitives for one tab
pub struct PagePrimitives {
    /// Tab driven by this instance
    page: PageHandle,

    /// Polling used by every visibility precondition
    wait: VisibilityWait,
}

impl PagePrimitives {
    pub fn new(page: PageHandle, wait: VisibilityWait) -> Self {
        Self { page, wait }
    }

    /// Get reference to the underlying page
    pub fn page(&self) -> &PageHandle {
        &self.page
    }

    /// Get reference to the visibility wait
    pub fn wait(&self) -> &VisibilityWait {
        &self.wait
    }
}

#[async_trait]
impl ActionPrimitives for PagePrimitives {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ActionError> {
        navigate::execute_navigate(self, url, timeout).await
    }

    async fn wait_visible(
        &self,
        target: &Selector,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        self.wait
            .until_visible(&self.page, target, timeout)
            .await
            .map(|_| ())
    }

    async fn click(&self, target: &Selector, timeout: Duration) -> Result<(), ActionError> {
        click::execute_click(self, target, timeout).await
    }

    async fn drag_to(
        &self,
        source: &Selector,
        target: &Selector,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        drag::execute_drag(self, source, target, timeout).await
    }

    async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }

    async fn close(&self) -> Result<(), ActionError> {
        self.page.close().await.map_err(ActionError::from)
    }
}

/// Opens tabs on a shared Chromium instance
pub struct BrowserPages {
    adapter: Arc<CdpAdapter>,
    wait: VisibilityWait,
}

impl BrowserPages {
    pub fn new(adapter: Arc<CdpAdapter>, wait: VisibilityWait) -> Self {
        Self { adapter, wait }
    }
}

#[async_trait]
impl PageSource for BrowserPages {
    async fn open_page(&self) -> Result<Box<dyn ActionPrimitives>, ActionError> {
        let page = self.adapter.new_page().await?;
        Ok(Box::new(PagePrimitives::new(page, self.wait)))
    }

    async fn shutdown(&self) -> Result<(), ActionError> {
        self.adapter.close().await.map_err(ActionError::from)
    }
}
