//! Drag primitive - Drag one visible control onto another

use crate::{errors::ActionError, primitives::PagePrimitives, types::Selector};
use cdp_adapter::Anchor;
use std::time::Duration;
use tokio::time::timeout as within;
use tracing::debug;

/// Execute drag primitive
///
/// Both anchors are re-resolved at call time; callers wait for visibility beforehand.
/// The whole gesture must finish within `timeout`.
pub async fn execute_drag(
    primitives: &PagePrimitives,
    source: &Selector,
    target: &Selector,
    timeout: Duration,
) -> Result<(), ActionError> {
    debug!(source = %source, target = %target, "Executing drag primitive");

    let gesture = async {
        let from = resolve_visible(primitives, source).await?;
        let to = resolve_visible(primitives, target).await?;
        primitives
            .page()
            .drag(&from, &to)
            .await
            .map_err(ActionError::from)
    };

    within(timeout, gesture).await.map_err(|_| {
        ActionError::WaitTimeout(format!(
            "drag '{}' -> '{}' exceeded {}ms",
            source,
            target,
            timeout.as_millis()
        ))
    })?
}

async fn resolve_visible(
    primitives: &PagePrimitives,
    selector: &Selector,
) -> Result<Anchor, ActionError> {
    primitives
        .page()
        .query(&selector.to_query())
        .await?
        .into_iter()
        .find(|anchor| anchor.visible)
        .ok_or_else(|| ActionError::AnchorNotFound(format!("'{}' is not on the page", selector)))
}
