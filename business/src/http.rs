//! Thin request wrapper over `reqwest`.
//!
//! Commands return `Send` futures and must not hold onto `reqwest` types across the
//! command boundary, so every call resolves into an owned [`Response`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Applied to every request; a hung service surfaces as a transport failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Fully-read response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP error: {message}")]
pub struct HttpError {
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    /// JSON payload, sent with `content-type: application/json`.
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    pub async fn send(self) -> HttpResult<Response> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HttpError::new(e.to_string()))?;

        let mut request = match self.method {
            Method::Get => client.get(&self.url),
            Method::Post => client.post(&self.url),
            Method::Delete => client.delete(&self.url),
        };
        if let Some(body) = self.body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?
            .to_vec();

        Ok(Response { status, body })
    }
}

/// Entry point for building requests.
///
/// ```ignore
/// let response = Client::get(config.users_url()?).send().await?;
/// if response.is_success() {
///     let users: ListUsersResponse = response.json()?;
/// }
/// ```
#[derive(Debug)]
pub struct Client;

impl Client {
    pub fn get(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Delete, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &[u8]) -> Response {
        Response {
            status,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_response_is_success() {
        assert!(response(200, b"").is_success());
        assert!(response(204, b"").is_success());
        assert!(!response(302, b"").is_success());
        assert!(!response(422, b"").is_success());
    }

    #[test]
    fn test_response_json() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Body {
            error: String,
        }

        let resp = response(400, br#"{"error": "taken"}"#);
        assert_eq!(
            resp.json::<Body>().unwrap(),
            Body {
                error: "taken".to_owned()
            }
        );
    }

    #[test]
    fn test_request_builder_json() {
        #[derive(serde::Serialize)]
        struct Body {
            name: String,
        }

        let builder = Client::post("http://localhost:4000/users/signup")
            .json(&Body {
                name: "test".to_owned(),
            })
            .unwrap();

        assert_eq!(builder.method, Method::Post);
        assert_eq!(builder.body.as_deref(), Some(br#"{"name":"test"}"#.as_slice()));
    }

    #[tokio::test]
    async fn test_json_body_is_sent_with_content_type() {
        use wiremock::matchers::{body_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/signup"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "name": "test" })))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let response = Client::post(format!("{}/users/signup", server.uri()))
            .json(&serde_json::json!({ "name": "test" }))
            .unwrap()
            .send()
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, b"created");
    }

    #[tokio::test]
    async fn test_send_to_unreachable_host_is_http_error() {
        let result = Client::get("http://127.0.0.1:9/users").send().await;
        assert!(result.is_err());
    }
}
