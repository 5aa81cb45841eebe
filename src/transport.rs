use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use url::Url;

/// A fully built http request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// The raw response of a [`Transport`], before any classification by status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send http request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Transport failure: {0}")]
    Other(String),
}

/// Performs a single http exchange. Implementations must not retry.
///
/// The production implementation is [`ReqwestTransport`]; tests use the
/// generated `MockTransport`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Per request timeout. Left to the `reqwest` client when unset.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, HeaderValue};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_reqwest_transport_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/me/player/play"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_string(r#"{"uris":["spotify:track:1"]}"#))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("x-test", "yes")
                    .set_body_string("accepted"),
            )
            .mount(&mock_server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer test-token"));

        let response = ReqwestTransport::new()
            .perform(HttpRequest {
                method: Method::PUT,
                url: Url::parse(&format!("{}/v1/me/player/play", mock_server.uri())).unwrap(),
                headers,
                body: Some(br#"{"uris":["spotify:track:1"]}"#.to_vec()),
            })
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert_eq!(response.body, b"accepted");
        assert_eq!(response.headers.get("x-test").unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_reqwest_transport_does_not_classify_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let response = ReqwestTransport::new()
            .perform(HttpRequest {
                method: Method::GET,
                url: Url::parse(&format!("{}/v1/me", mock_server.uri())).unwrap(),
                headers: HeaderMap::new(),
                body: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, b"boom");
    }

    #[tokio::test]
    async fn test_reqwest_transport_connection_error() {
        // Nothing listens on port 9 of the loopback interface.
        let result = ReqwestTransport::new()
            .with_timeout(Duration::from_secs(2))
            .perform(HttpRequest {
                method: Method::GET,
                url: Url::parse("http://127.0.0.1:9/v1/me").unwrap(),
                headers: HeaderMap::new(),
                body: None,
            })
            .await;

        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
