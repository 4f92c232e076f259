//! Click primitive - Wait for a control, then click its center

use crate::{errors::ActionError, primitives::PagePrimitives, types::Selector};
use std::time::Duration;
use tokio::time::{timeout as within, Instant};
use tracing::debug;

/// Execute click primitive
///
/// Steps:
/// 1. Wait for the target to be visible (bounded by `timeout`)
/// 2. Dispatch move, press and release on its center within the remaining time
pub async fn execute_click(
    primitives: &PagePrimitives,
    target: &Selector,
    timeout: Duration,
) -> Result<(), ActionError> {
    let deadline = Instant::now() + timeout;
    debug!(target = %target, "Executing click primitive");

    let anchor = primitives
        .wait()
        .until_visible(primitives.page(), target, timeout)
        .await?;

    let remaining = deadline.saturating_duration_since(Instant::now());
    within(remaining, primitives.page().click_at(&anchor))
        .await
        .map_err(|_| {
            ActionError::WaitTimeout(format!(
                "click on '{}' exceeded {}ms",
                target,
                timeout.as_millis()
            ))
        })??;

    debug!(target = %target, "Click completed");
    Ok(())
}
