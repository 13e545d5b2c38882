pub mod error;

pub use error::{Result, SessionError};

use std::time::Duration;

use serde_json::Value;
use thirtyfour::prelude::*;
use thirtyfour::common::capabilities::firefox::FirefoxPreferences;
use tracing::debug;

/// Poll cadence for bounded element waits.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One live browser session. The page is an externally-controlled,
/// asynchronously-updating resource; every navigation, scroll and click
/// against it goes through this handle and is serialized on it.
pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    /// Connect to a WebDriver server and open a Firefox session.
    pub async fn connect(
        server_url: &str,
        headless: bool,
        accept_languages: &str,
    ) -> Result<Self> {
        let mut caps = DesiredCapabilities::firefox();
        if headless {
            caps.set_headless()?;
        }
        let mut prefs = FirefoxPreferences::new();
        prefs.set("intl.accept_languages", accept_languages)?;
        caps.set_preferences(prefs)?;

        let driver = WebDriver::new(server_url, caps).await?;
        debug!(server_url, headless, "WebDriver session established");
        Ok(Self { driver })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    /// Smooth-scroll the document to its current bottom.
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.driver
            .execute(
                r#"window.scrollTo({
                    top: document.documentElement.scrollHeight,
                    behavior: 'smooth'
                });"#,
                vec![],
            )
            .await?;
        Ok(())
    }

    /// Scroll the first element matching `css` into view. A missing element
    /// is reported, not raised; the caller decides whether it matters.
    pub async fn scroll_into_view(&self, css: &str) -> Result<bool> {
        match self.driver.find(By::Css(css)).await {
            Ok(elem) => {
                elem.scroll_into_view().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Wait (bounded) for at least one element matching `css` to exist.
    /// Expiry is a recoverable outcome and comes back as `false`.
    pub async fn wait_for_present(&self, css: &str, timeout: Duration) -> Result<bool> {
        let found = self
            .driver
            .query(By::Css(css))
            .wait(timeout, POLL_INTERVAL)
            .exists()
            .await?;
        if !found {
            debug!(selector = css, ?timeout, "Element did not appear within bound");
        }
        Ok(found)
    }

    /// Number of elements currently materialized for `css`.
    pub async fn count(&self, css: &str) -> Result<usize> {
        Ok(self.driver.find_all(By::Css(css)).await?.len())
    }

    /// First matching element's trimmed text, if present.
    pub async fn text_of(&self, css: &str) -> Result<Option<String>> {
        match self.driver.find(By::Css(css)).await {
            Ok(elem) => Ok(Some(elem.text().await?.trim().to_string())),
            Err(_) => Ok(None),
        }
    }

    /// Run an injected script and hand back its JSON result.
    pub async fn execute_json(&self, script: &str) -> Result<Value> {
        let ret = self
            .driver
            .execute(script, vec![])
            .await
            .map_err(|err| SessionError::Script(err.to_string()))?;
        Ok(ret.json().clone())
    }

    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
