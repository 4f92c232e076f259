//! Navigate primitive - Load a URL within a deadline

use crate::{errors::ActionError, primitives::PagePrimitives};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub async fn execute_navigate(
    primitives: &PagePrimitives,
    url: &str,
    timeout: Duration,
) -> Result<(), ActionError> {
    if url.trim().is_empty() {
        return Err(ActionError::Internal("URL cannot be empty".to_string()));
    }

    let start = Instant::now();
    info!(url = %url, timeout_ms = timeout.as_millis() as u64, "Executing navigate primitive");

    primitives.page().navigate(url, timeout).await?;

    debug!(
        url = %url,
        latency_ms = start.elapsed().as_millis() as u64,
        "Navigation completed"
    );
    Ok(())
}
