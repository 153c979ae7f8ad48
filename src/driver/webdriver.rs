use crate::error::EngageError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// W3C WebDriver element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ElementId(String);

/// Minimal W3C WebDriver client over a local chromedriver/geckodriver
/// endpoint. Only the verbs the platform drivers need: navigate, refresh,
/// bounded element waits, text/property extraction, keystrokes, clicks.
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
    element_timeout: Duration,
}

fn parse_session_id(value: &Value) -> Option<String> {
    value["value"]["sessionId"].as_str().map(str::to_string)
}

fn parse_element_id(value: &Value) -> Option<ElementId> {
    value["value"][ELEMENT_KEY]
        .as_str()
        .map(|id| ElementId(id.to_string()))
}

impl WebDriverSession {
    /// Open a new browser session. Failure here is process-fatal — there is
    /// nothing to monitor without a browser.
    pub async fn new(base_url: &str, headless: bool, element_timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(2)
            .build()
            .context("failed to build HTTP client")?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut args = vec!["--window-size=1080,1024".to_string()];
        if headless {
            args.push("--headless=new".to_string());
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let resp = client
            .post(format!("{}/session", base_url))
            .json(&body)
            .send()
            .await
            .context("failed to reach WebDriver endpoint")?;
        let status = resp.status();
        let value: Value = resp
            .json()
            .await
            .context("failed to parse WebDriver session response")?;
        if !status.is_success() {
            anyhow::bail!("WebDriver session creation failed ({}): {}", status, value);
        }
        let session_id =
            parse_session_id(&value).context("WebDriver response had no session id")?;

        Ok(Self {
            client,
            base_url,
            session_id,
            element_timeout: Duration::from_millis(element_timeout_ms),
        })
    }

    fn session_url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, EngageError> {
        let resp = self
            .client
            .post(self.session_url(path))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let value: Value = resp.json().await?;
        if !status.is_success() {
            return Err(EngageError::Service(format!(
                "WebDriver POST {} failed ({}): {}",
                path, status, value
            )));
        }
        Ok(value)
    }

    async fn get(&self, path: &str) -> Result<Value, EngageError> {
        let resp = self.client.get(self.session_url(path)).send().await?;
        let status = resp.status();
        let value: Value = resp.json().await?;
        if !status.is_success() {
            return Err(EngageError::Service(format!(
                "WebDriver GET {} failed ({}): {}",
                path, status, value
            )));
        }
        Ok(value)
    }

    pub async fn goto(&self, url: &str) -> Result<(), EngageError> {
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<(), EngageError> {
        self.post("/refresh", json!({})).await?;
        Ok(())
    }

    /// Single find attempt; absent element is Ok(None), not an error.
    async fn find(&self, css: &str) -> Result<Option<ElementId>, EngageError> {
        let resp = self
            .client
            .post(self.session_url("/element"))
            .json(&json!({ "using": "css selector", "value": css }))
            .send()
            .await?;
        let status = resp.status();
        let value: Value = resp.json().await?;
        if status.is_success() {
            return Ok(parse_element_id(&value));
        }
        if value["value"]["error"].as_str() == Some("no such element") {
            return Ok(None);
        }
        Err(EngageError::Service(format!(
            "WebDriver element lookup failed ({}): {}",
            status, value
        )))
    }

    /// Poll for an element until the configured bound; exceeding it is a
    /// recoverable extraction timeout, not a session failure.
    pub async fn wait_for(&self, css: &str) -> Result<ElementId, EngageError> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            if let Some(el) = self.find(css).await? {
                return Ok(el);
            }
            if Instant::now() >= deadline {
                return Err(EngageError::ExtractionTimeout {
                    what: format!("element {}", css),
                    timeout_ms: self.element_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn text(&self, el: &ElementId) -> Result<String, EngageError> {
        let value = self.get(&format!("/element/{}/text", el.0)).await?;
        Ok(value["value"].as_str().unwrap_or_default().to_string())
    }

    /// Read a DOM property (e.g. `href` of an anchor).
    pub async fn property(&self, el: &ElementId, name: &str) -> Result<String, EngageError> {
        let value = self
            .get(&format!("/element/{}/property/{}", el.0, name))
            .await?;
        Ok(value["value"].as_str().unwrap_or_default().to_string())
    }

    pub async fn send_keys(&self, el: &ElementId, text: &str) -> Result<(), EngageError> {
        self.post(&format!("/element/{}/value", el.0), json!({ "text": text }))
            .await?;
        Ok(())
    }

    pub async fn click(&self, el: &ElementId) -> Result<(), EngageError> {
        self.post(&format!("/element/{}/click", el.0), json!({}))
            .await?;
        Ok(())
    }

    /// Tear down the browser session. Best effort — shutdown should not fail
    /// because the driver already went away.
    pub async fn close(&self) {
        let result = self
            .client
            .delete(format!("{}/session/{}", self.base_url, self.session_id))
            .send()
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to close WebDriver session");
        }
    }
}
