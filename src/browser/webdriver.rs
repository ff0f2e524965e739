use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};

use crate::{
    browser::{Browser, BrowserLauncher, Element, Selector},
    config,
    error::BrowserError,
};

/// Key under which W3C WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const DEFAULT_IMPLICIT_WAIT_MS: u64 = 5000;

/// Launches Chrome sessions through a WebDriver server such as `chromedriver`.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    client: Client,
    base_url: String,
    headless: bool,
    implicit_wait_ms: u64,
}

impl WebDriverLauncher {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headless: true,
            implicit_wait_ms: DEFAULT_IMPLICIT_WAIT_MS,
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::webdriver_url()).headless(config::browser_headless())
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// How long the driver keeps polling for an element before reporting it
    /// missing.
    pub fn implicit_wait_ms(mut self, ms: u64) -> Self {
        self.implicit_wait_ms = ms;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn capabilities(&self) -> Value {
        let args: Vec<&str> = if self.headless {
            vec!["headless", "disable-gpu"]
        } else {
            Vec::new()
        };

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args },
                    "timeouts": { "implicit": self.implicit_wait_ms },
                }
            }
        })
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn Browser>, BrowserError> {
        let url = format!("{}/session", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.capabilities())
            .send()
            .await?;
        let value = read_value(response, None).await?;

        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::Session("response carries no sessionId".to_string()))?;

        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            session_url: format!("{}/session/{}", self.base_url, session_id),
        }))
    }
}

/// One WebDriver session.
#[derive(Debug)]
pub struct WebDriverSession {
    client: Client,
    session_url: String,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        selector: Option<&Selector>,
    ) -> Result<Value, BrowserError> {
        let url = format!("{}{}", self.session_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        read_value(response, selector).await
    }
}

/// Unwraps the `value` member of a WebDriver response, mapping protocol
/// errors onto [`BrowserError`].
async fn read_value(
    response: reqwest::Response,
    selector: Option<&Selector>,
) -> Result<Value, BrowserError> {
    let status = response.status();
    let body: Value = response.json().await?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let code = value["error"].as_str().unwrap_or("unknown error");
    let message = value["message"].as_str().unwrap_or_default().to_string();
    let target = selector
        .map(|s| s.to_string())
        .unwrap_or_else(|| "<page>".to_string());

    Err(match code {
        "no such element" => BrowserError::NoSuchElement(target),
        "element not interactable"
        | "element click intercepted"
        | "stale element reference"
        | "invalid element state" => BrowserError::Interaction {
            selector: target,
            message,
        },
        _ => BrowserError::Session(format!("{} (HTTP {}): {}", code, status.as_u16(), message)),
    })
}

#[async_trait]
impl Browser for WebDriverSession {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })), None)
            .await
            .map(|_| ())
    }

    async fn find(&self, selector: &Selector) -> Result<Element, BrowserError> {
        let body = json!({ "using": "css selector", "value": selector.to_css() });
        let value = self
            .command(Method::POST, "/element", Some(body), Some(selector))
            .await?;

        let id = value[ELEMENT_KEY]
            .as_str()
            .ok_or_else(|| BrowserError::Session(format!("malformed element reference for {}", selector)))?;

        Ok(Element {
            selector: selector.clone(),
            id: id.to_string(),
        })
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), BrowserError> {
        let path = format!("/element/{}/value", element.id);
        self.command(
            Method::POST,
            &path,
            Some(json!({ "text": text })),
            Some(&element.selector),
        )
        .await
        .map(|_| ())
    }

    async fn click(&self, element: &Element) -> Result<(), BrowserError> {
        let path = format!("/element/{}/click", element.id);
        self.command(Method::POST, &path, Some(json!({})), Some(&element.selector))
            .await
            .map(|_| ())
    }

    // Reads the live DOM property so that typed values and checkbox state are
    // current, falling back to nothing for `false`/`null`.
    async fn attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let path = format!("/element/{}/property/{}", element.id, name);
        let value = self
            .command(Method::GET, &path, None, Some(&element.selector))
            .await?;

        Ok(match value {
            Value::String(s) => Some(s),
            Value::Bool(true) => Some("true".to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    async fn scroll_to(&self, y: u32) -> Result<(), BrowserError> {
        let body = json!({ "script": "window.scrollTo(0, arguments[0]);", "args": [y] });
        self.command(Method::POST, "/execute/sync", Some(body), None)
            .await
            .map(|_| ())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.command(Method::DELETE, "", None, None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{Expectation, Server, matchers::*, responders::*};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn launcher(server: &Server) -> WebDriverLauncher {
        WebDriverLauncher::new(format!("http://{}", server.addr())).implicit_wait_ms(0)
    }

    fn expect_session(server: &Server) {
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/session"),
                request::body(json_decoded(eq(json!({
                    "capabilities": {
                        "alwaysMatch": {
                            "browserName": "chrome",
                            "goog:chromeOptions": { "args": ["headless", "disable-gpu"] },
                            "timeouts": { "implicit": 0 },
                        }
                    }
                })))),
            ])
            .respond_with(json_encoded(json!({
                "value": { "sessionId": "s1", "capabilities": {} }
            }))),
        );
    }

    #[tokio::test]
    async fn find_type_and_read_value() -> TestResult {
        let server = Server::run();
        expect_session(&server);
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/session/s1/element"),
                request::body(json_decoded(eq(json!({
                    "using": "css selector",
                    "value": "[id=\"login-username\"]",
                })))),
            ])
            .respond_with(json_encoded(json!({ "value": { (ELEMENT_KEY): "e7" } }))),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/session/s1/element/e7/value"),
                request::body(json_decoded(eq(json!({ "text": "someone" })))),
            ])
            .respond_with(json_encoded(json!({ "value": null }))),
        );
        server.expect(
            Expectation::matching(request::method_path(
                "GET",
                "/session/s1/element/e7/property/value",
            ))
            .respond_with(json_encoded(json!({ "value": "someone" }))),
        );

        let browser = launcher(&server).launch().await?;
        let element = browser.find(&Selector::id("login-username")).await?;
        assert_eq!(element.id, "e7");
        browser.type_text(&element, "someone").await?;
        assert_eq!(
            browser.attribute(&element, "value").await?,
            Some("someone".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_element_maps_to_no_such_element() -> TestResult {
        let server = Server::run();
        expect_session(&server);
        server.expect(
            Expectation::matching(request::method_path("POST", "/session/s1/element"))
                .respond_with(status_code(404).body(
                    json!({
                        "value": {
                            "error": "no such element",
                            "message": "Unable to locate element",
                            "stacktrace": ""
                        }
                    })
                    .to_string(),
                )),
        );

        let browser = launcher(&server).launch().await?;
        let err = browser
            .find(&Selector::css(".btn-green"))
            .await
            .expect_err("element lookup should fail");
        assert!(
            matches!(&err, BrowserError::NoSuchElement(s) if s == ".btn-green"),
            "{err:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn intercepted_click_maps_to_interaction_error() -> TestResult {
        let server = Server::run();
        expect_session(&server);
        server.expect(
            Expectation::matching(request::method_path("POST", "/session/s1/element/e1/click"))
                .respond_with(status_code(400).body(
                    json!({
                        "value": {
                            "error": "element click intercepted",
                            "message": "Other element would receive the click"
                        }
                    })
                    .to_string(),
                )),
        );

        let browser = launcher(&server).launch().await?;
        let element = Element {
            selector: Selector::id("login-button"),
            id: "e1".to_string(),
        };
        let err = browser.click(&element).await.expect_err("click should fail");
        assert!(
            matches!(&err, BrowserError::Interaction { selector, .. } if selector == "#login-button"),
            "{err:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn session_not_created_is_a_session_error() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/session")).respond_with(
                status_code(500).body(
                    json!({
                        "value": {
                            "error": "session not created",
                            "message": "Chrome failed to start"
                        }
                    })
                    .to_string(),
                ),
            ),
        );

        let err = match launcher(&server).launch().await {
            Ok(_) => panic!("launch should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, BrowserError::Session(_)), "{err:?}");
        assert!(err.to_string().contains("Chrome failed to start"), "{err}");

        Ok(())
    }

    #[tokio::test]
    async fn close_deletes_the_session() -> TestResult {
        let server = Server::run();
        expect_session(&server);
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/session/s1"))
                .times(1)
                .respond_with(json_encoded(json!({ "value": null }))),
        );

        let browser = launcher(&server).launch().await?;
        browser.close().await?;

        Ok(())
    }
}
