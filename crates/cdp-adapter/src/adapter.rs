use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::commands::{drag_path, Anchor, MouseAction, QuerySpec};
use crate::config::CdpConfig;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::ids::{BrowserId, PageId};
use crate::metrics;

/// Owns one Chromium process and the task that pumps its CDP connection.
pub struct CdpAdapter {
    pub browser_id: BrowserId,
    pub cfg: CdpConfig,
    browser: Mutex<Option<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
}

impl CdpAdapter {
    pub async fn launch(cfg: CdpConfig) -> Result<Self, AdapterError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(&cfg.user_data_dir)
            .window_size(cfg.window_width, cfg.window_height);
        if !cfg.headless {
            builder = builder.with_head();
        }
        if !cfg.executable.as_os_str().is_empty() {
            builder = builder.chrome_executable(&cfg.executable);
        }
        let browser_config = builder
            .build()
            .map_err(|err| AdapterError::new(AdapterErrorKind::Launch).with_hint(err))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Launch).with_hint(format!(
                "failed to launch '{}': {}",
                cfg.executable.display(),
                err
            ))
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-adapter", "cdp handler stopped: {}", err);
                    break;
                }
            }
        });

        let browser_id = BrowserId::new();
        info!(
            target: "cdp-adapter",
            browser = ?browser_id.0,
            headless = cfg.headless,
            "chromium launched"
        );

        Ok(Self {
            browser_id,
            cfg,
            browser: Mutex::new(Some(browser)),
            handler_task: Mutex::new(Some(handler_task)),
        })
    }

    /// Open a fresh blank tab.
    pub async fn new_page(&self) -> Result<PageHandle, AdapterError> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::Internal).with_hint("browser already closed")
        })?;
        let page = browser.new_page("about:blank").await?;
        metrics::record_page_opened();
        let handle = PageHandle {
            id: PageId::new(),
            page,
            drag_steps: self.cfg.drag_steps,
        };
        debug!(target: "cdp-adapter", page = ?handle.id.0, "page opened");
        Ok(handle)
    }

    /// Close the browser and stop the handler task. Calling it twice is harmless.
    pub async fn close(&self) -> Result<(), AdapterError> {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            browser.close().await?;
            if let Err(err) = browser.wait().await {
                warn!(target: "cdp-adapter", "waiting for chromium exit failed: {}", err);
            }
        }
        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }
        info!(target: "cdp-adapter", browser = ?self.browser_id.0, "chromium closed");
        Ok(())
    }
}

/// One browser tab. Every method is a single round of CDP commands without retries.
#[derive(Clone)]
pub struct PageHandle {
    pub id: PageId,
    page: Page,
    drag_steps: u32,
}

impl PageHandle {
    pub async fn navigate(&self, url: &str, deadline: Duration) -> Result<(), AdapterError> {
        let start = Instant::now();
        metrics::record_command();
        match timeout(deadline, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                metrics::record_command_success(start.elapsed());
                Ok(())
            }
            Ok(Err(err)) => {
                metrics::record_command_failure();
                Err(err.into())
            }
            Err(_) => {
                metrics::record_command_failure();
                Err(AdapterError::new(AdapterErrorKind::NavTimeout)
                    .with_hint(format!("'{}' did not load within {:?}", url, deadline))
                    .retriable(true))
            }
        }
    }

    /// Evaluate `spec` in the page and return every matching element.
    pub async fn query(&self, spec: &QuerySpec) -> Result<Vec<Anchor>, AdapterError> {
        let expression = spec.to_expression()?;
        let start = Instant::now();
        metrics::record_command();
        let result = match self.page.evaluate(expression).await {
            Ok(result) => result,
            Err(err) => {
                metrics::record_command_failure();
                return Err(err.into());
            }
        };
        metrics::record_command_success(start.elapsed());

        let value = result.value().cloned().ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint("query did not return a value")
        })?;
        serde_json::from_value(value).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("query returned unexpected shape: {}", err))
        })
    }

    pub async fn dispatch_mouse(
        &self,
        action: MouseAction,
        x: f64,
        y: f64,
        pressed: bool,
    ) -> Result<(), AdapterError> {
        let kind = match action {
            MouseAction::Move => DispatchMouseEventType::MouseMoved,
            MouseAction::Press => DispatchMouseEventType::MousePressed,
            MouseAction::Release => DispatchMouseEventType::MouseReleased,
        };
        let mut builder = DispatchMouseEventParams::builder().r#type(kind).x(x).y(y);
        if pressed || action != MouseAction::Move {
            builder = builder.button(MouseButton::Left).buttons(1).click_count(1);
        }
        let params = builder
            .build()
            .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))?;

        let start = Instant::now();
        metrics::record_command();
        match self.page.execute(params).await {
            Ok(_) => {
                metrics::record_command_success(start.elapsed());
                Ok(())
            }
            Err(err) => {
                metrics::record_command_failure();
                Err(err.into())
            }
        }
    }

    pub async fn click_at(&self, anchor: &Anchor) -> Result<(), AdapterError> {
        self.dispatch_mouse(MouseAction::Move, anchor.x, anchor.y, false)
            .await?;
        self.dispatch_mouse(MouseAction::Press, anchor.x, anchor.y, true)
            .await?;
        self.dispatch_mouse(MouseAction::Release, anchor.x, anchor.y, true)
            .await
    }

    /// Press on `from`, move through intermediate points and release on `to`.
    pub async fn drag(&self, from: &Anchor, to: &Anchor) -> Result<(), AdapterError> {
        self.dispatch_mouse(MouseAction::Move, from.x, from.y, false)
            .await?;
        self.dispatch_mouse(MouseAction::Press, from.x, from.y, true)
            .await?;
        for (x, y) in drag_path(from, to, self.drag_steps) {
            self.dispatch_mouse(MouseAction::Move, x, y, true).await?;
        }
        self.dispatch_mouse(MouseAction::Release, to.x, to.y, true)
            .await
    }

    pub async fn url(&self) -> Result<Option<String>, AdapterError> {
        Ok(self.page.url().await?)
    }

    pub async fn close(&self) -> Result<(), AdapterError> {
        self.page.clone().close().await?;
        debug!(target: "cdp-adapter", page = ?self.id.0, "page closed");
        Ok(())
    }
}
