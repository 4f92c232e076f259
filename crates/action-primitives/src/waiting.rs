//! Bounded waiting for elements to become visible

use crate::{errors::ActionError, types::Selector};
use async_trait::async_trait;
use cdp_adapter::{AdapterError, Anchor, PageHandle, QuerySpec};
use std::time::Duration;
use tokio::time::{sleep, timeout as within, Instant};
use tracing::debug;

/// Anything that can resolve a query to element anchors right now.
#[async_trait]
pub trait AnchorProbe: Send + Sync {
    async fn probe(&self, query: &QuerySpec) -> Result<Vec<Anchor>, AdapterError>;
}

#[async_trait]
impl AnchorProbe for PageHandle {
    async fn probe(&self, query: &QuerySpec) -> Result<Vec<Anchor>, AdapterError> {
        self.query(query).await
    }
}

/// Polls a probe until the first visible match appears or the timeout expires.
#[derive(Clone, Copy, Debug)]
pub struct VisibilityWait {
    /// Delay between two probes (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for VisibilityWait {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

impl VisibilityWait {
    /// Resolve `target` to its first visible anchor.
    ///
    /// Probe failures inside the window are retried; they usually mean the page is still
    /// loading. A probe that hangs is cut off at the deadline. Expiry is always reported as
    /// `WaitTimeout`, carrying the last probe error.
    pub async fn until_visible<P: AnchorProbe + ?Sized>(
        &self,
        probe: &P,
        target: &Selector,
        timeout: Duration,
    ) -> Result<Anchor, ActionError> {
        let query = target.to_query();
        let deadline = Instant::now() + timeout;
        let mut last_error: Option<AdapterError> = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match within(remaining, probe.probe(&query)).await {
                Ok(Ok(anchors)) => {
                    if let Some(anchor) = anchors.into_iter().find(|anchor| anchor.visible) {
                        return Ok(anchor);
                    }
                }
                Ok(Err(err)) => {
                    debug!("probe for '{}' failed: {}", target, err);
                    last_error = Some(err);
                }
                Err(_) => debug!("probe for '{}' still pending at the deadline", target),
            }

            if Instant::now() >= deadline {
                let mut detail = format!(
                    "'{}' not visible within {}ms",
                    target,
                    timeout.as_millis()
                );
                if let Some(err) = last_error {
                    detail.push_str(&format!(" (last error: {})", err));
                }
                return Err(ActionError::WaitTimeout(detail));
            }

            sleep(Duration::from_millis(self.poll_interval_ms)).await;
        }
    }
}
