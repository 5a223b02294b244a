//! # Blocking WebDriver Session
//!
//! A minimal W3C WebDriver client implementing the [`Browser`] boundary over
//! plain blocking HTTP. It speaks to a local driver process (chromedriver,
//! geckodriver) and covers exactly the commands the pipeline needs: session
//! lifecycle, navigation, element lookup by XPath, text extraction,
//! keystrokes and clicks. Bounded waits are implemented by polling the
//! element lookup at the configured interval.
//!
//! The session is created in the constructor and deleted on drop; a failed
//! delete is ignored since the driver process reaps orphaned sessions.

use crate::browser::{Browser, BrowserError, ElementHandle, Locator};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::thread;
use std::time::{Duration, Instant};

/// JSON key the W3C protocol uses for element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// A live browser session behind a WebDriver endpoint.
pub struct WebDriverBrowser {
    http: Client,
    endpoint: String,
    session_id: String,
    poll_interval: Duration,
}

impl WebDriverBrowser {
    /// Start a new session against the driver at `endpoint`
    /// (e.g. `http://localhost:9515`).
    pub fn new(endpoint: &str, poll_interval: Duration) -> Result<Self, BrowserError> {
        let http = Client::new();
        let body = json!({
            "capabilities": {
                "alwaysMatch": { "browserName": "chrome" }
            }
        });
        let value = post_json(&http, &format!("{}/session", endpoint), &body)?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Session("no sessionId in new-session reply".to_string()))?
            .to_string();

        Ok(WebDriverBrowser {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            session_id,
            poll_interval,
        })
    }

    fn session_url(&self, command: &str) -> String {
        format!("{}/session/{}/{}", self.endpoint, self.session_id, command)
    }

    /// Single-element lookup; [`BrowserError::NotFound`] when the driver
    /// reports no such element.
    fn find_element(&self, locator: &Locator) -> Result<ElementHandle, BrowserError> {
        let body = selector_body(locator);
        let value = post_json(&self.http, &self.session_url("element"), &body)?;
        element_from_value(&value)
            .ok_or_else(|| BrowserError::NotFound(locator.expr().to_string()))
    }
}

impl Browser for WebDriverBrowser {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        post_json(&self.http, &self.session_url("url"), &json!({ "url": url }))?;
        Ok(())
    }

    fn wait_for(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find_element(locator) {
                Ok(handle) => return Ok(handle),
                Err(BrowserError::NotFound(_)) => {}
                Err(other) => return Err(other),
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    timeout,
                    locator: locator.to_string(),
                });
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, BrowserError> {
        let body = selector_body(locator);
        let value = post_json(&self.http, &self.session_url("elements"), &body)?;
        let entries = value
            .as_array()
            .ok_or_else(|| BrowserError::Session("elements reply is not an array".to_string()))?;
        entries
            .iter()
            .map(|entry| {
                element_from_value(entry).ok_or_else(|| {
                    BrowserError::Session("elements reply entry without element key".to_string())
                })
            })
            .collect()
    }

    fn read_text(&mut self, element: &ElementHandle) -> Result<String, BrowserError> {
        let url = self.session_url(&format!("element/{}/text", element.0));
        let value = get_json(&self.http, &url)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Session("element text reply is not a string".to_string()))
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), BrowserError> {
        let url = self.session_url(&format!("element/{}/value", element.0));
        post_json(&self.http, &url, &json!({ "text": text }))?;
        Ok(())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        let url = self.session_url(&format!("element/{}/click", element.0));
        post_json(&self.http, &url, &json!({}))?;
        Ok(())
    }
}

impl Drop for WebDriverBrowser {
    fn drop(&mut self) {
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        let _ = self.http.delete(&url).send();
    }
}

fn selector_body(locator: &Locator) -> Value {
    match locator {
        Locator::XPath(expr) => json!({ "using": "xpath", "value": expr }),
    }
}

fn element_from_value(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementHandle(id.to_string()))
}

fn post_json(http: &Client, url: &str, body: &Value) -> Result<Value, BrowserError> {
    let response = http
        .post(url)
        .json(body)
        .send()
        .map_err(|e| BrowserError::Session(e.to_string()))?;
    unwrap_reply(response)
}

fn get_json(http: &Client, url: &str) -> Result<Value, BrowserError> {
    let response = http
        .get(url)
        .send()
        .map_err(|e| BrowserError::Session(e.to_string()))?;
    unwrap_reply(response)
}

/// Unwrap the `{"value": ...}` envelope every WebDriver reply carries,
/// turning protocol errors into [`BrowserError`]s.
fn unwrap_reply(response: reqwest::blocking::Response) -> Result<Value, BrowserError> {
    let status = response.status();
    let reply: Value = response
        .json()
        .map_err(|e| BrowserError::Session(e.to_string()))?;
    let value = reply.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        // New-session replies nest sessionId inside value.
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if error == "no such element" {
        Err(BrowserError::NotFound(message.to_string()))
    } else {
        Err(BrowserError::Session(format!("{}: {}", error, message)))
    }
}
