//! Headless-browser page rendering.
//!
//! The archive pages populate their listings with script and lazy-load older
//! entries as the viewport approaches the bottom, so a plain HTTP fetch sees
//! only a fraction of the list. One headless Chromium session is launched for
//! the whole run; each source page is navigated, scrolled out until its
//! height stops growing, and then serialized back as HTML for extraction.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};
use url::Url;

/// Settle time after each scroll step, long enough for lazy-loaded rows to
/// attach and grow the document.
const SCROLL_SETTLE: Duration = Duration::from_millis(600);

/// Locate a Chrome/Chromium binary: explicit path first, then PATH lookup.
fn find_browser(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }
    None
}

/// A headless Chromium session, acquired once per run.
pub struct PageRenderer {
    browser: Browser,
}

impl PageRenderer {
    /// Launch headless Chromium and spawn its CDP event handler task.
    pub async fn launch(chrome_path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = find_browser(chrome_path) {
            debug!(path = %path.display(), "Using browser executable");
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| format!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config).await?;
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        info!("Launched headless browser");
        Ok(Self { browser })
    }

    /// Navigate to `url`, scroll the page out, and return its rendered HTML.
    #[instrument(level = "info", skip(self), fields(%url))]
    pub async fn render(&self, url: &Url) -> Result<String, Box<dyn Error>> {
        let page = self.browser.new_page(url.as_str()).await?;
        page.wait_for_navigation().await?;
        self.scroll_to_bottom(&page).await?;

        let html: String = page
            .evaluate("document.documentElement.outerHTML")
            .await?
            .into_value()?;
        page.close().await?;

        info!(bytes = html.len(), "Rendered page");
        Ok(html)
    }

    /// Advance the scroll position until the document stops growing, so
    /// lazy-loaded entries are present before extraction.
    async fn scroll_to_bottom(&self, page: &Page) -> Result<(), Box<dyn Error>> {
        let mut height = page_height(page).await?;
        loop {
            page.evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await?;
            sleep(SCROLL_SETTLE).await;
            let grown = page_height(page).await?;
            if grown <= height {
                break;
            }
            height = grown;
        }
        debug!(height, "Scroll settled");
        Ok(())
    }

    /// Shut the browser down. Called on every exit path of the run.
    pub async fn close(mut self) -> Result<(), Box<dyn Error>> {
        self.browser.close().await?;
        Ok(())
    }
}

async fn page_height(page: &Page) -> Result<i64, Box<dyn Error>> {
    let value: serde_json::Value = page
        .evaluate("document.body.scrollHeight")
        .await?
        .into_value()?;
    Ok(value.as_i64().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_browser_ignores_missing_explicit_path() {
        // Falls through to PATH lookup (may or may not resolve on CI);
        // the explicit bogus path must never be returned.
        if let Some(found) = find_browser(Some("/nonexistent/chrome-binary")) {
            assert_ne!(found, PathBuf::from("/nonexistent/chrome-binary"));
        }
    }
}
