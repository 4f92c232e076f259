//! CDP Adapter Integration Tests
//!
//! Drives a real Chromium through the adapter against an inline test page.
//!
//! Run with:
//! ```bash
//! export CARGOBOT_USE_REAL_CHROME=1
//! export CARGOBOT_CHROME=/usr/bin/google-chrome  # or path to chrome
//! cargo test -p cdp-adapter --test integration_tests -- --nocapture
//! ```

use cdp_adapter::{CdpAdapter, CdpConfig, QuerySpec};
use std::env;
use std::time::Duration;
use tempfile::TempDir;

const PAGE: &str = "data:text/html,<button id='play' style='margin:40px'>Play</button>\
<p class='modal'>Clear</p><p class='modal' style='display:none'>CLEAR</p>";

fn should_run_real_tests() -> bool {
    env::var("CARGOBOT_USE_REAL_CHROME")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn test_config() -> (CdpConfig, TempDir) {
    let mut cfg = CdpConfig::default();
    cfg.headless = true;
    if let Ok(chrome_path) = env::var("CARGOBOT_CHROME") {
        cfg.executable = chrome_path.into();
    }
    let profile = tempfile::tempdir().expect("create temporary chrome profile");
    cfg.user_data_dir = profile.path().into();
    (cfg, profile)
}

#[tokio::test]
async fn launch_query_click_and_close() {
    if !should_run_real_tests() {
        println!("Skipping real browser test (CARGOBOT_USE_REAL_CHROME not set)");
        return;
    }

    let (cfg, _profile) = test_config();
    let adapter = CdpAdapter::launch(cfg).await.expect("launch chromium");
    let page = adapter.new_page().await.expect("open page");
    page.navigate(PAGE, Duration::from_secs(15))
        .await
        .expect("navigate");

    let anchors = page.query(&QuerySpec::css("#play")).await.expect("query");
    assert_eq!(anchors.len(), 1);
    assert!(anchors[0].visible);
    page.click_at(&anchors[0]).await.expect("click");

    // text filter is case-insensitive; hidden matches are reported as not visible
    let modal = page
        .query(&QuerySpec::css("p.modal").with_text("clear"))
        .await
        .expect("query text");
    assert_eq!(modal.len(), 2);
    assert_eq!(modal.iter().filter(|a| a.visible).count(), 1);

    let url = page.url().await.expect("url");
    assert!(url.unwrap_or_default().starts_with("data:text/html"));

    page.close().await.expect("close page");
    adapter.close().await.expect("close browser");
    adapter.close().await.expect("second close is harmless");

    let stats = cdp_adapter::metrics::snapshot();
    assert!(stats.pages_opened >= 1);
}

#[tokio::test]
async fn navigation_past_deadline_is_a_timeout() {
    if !should_run_real_tests() {
        println!("Skipping real browser test (CARGOBOT_USE_REAL_CHROME not set)");
        return;
    }

    let (cfg, _profile) = test_config();
    let adapter = CdpAdapter::launch(cfg).await.expect("launch chromium");
    let page = adapter.new_page().await.expect("open page");
    // 10.255.255.1 is unroutable: the load never completes
    let err = page
        .navigate("http://10.255.255.1/", Duration::from_millis(300))
        .await
        .expect_err("navigation should time out");
    assert_eq!(err.kind, cdp_adapter::AdapterErrorKind::NavTimeout);
    adapter.close().await.expect("close browser");
}
