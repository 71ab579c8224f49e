use reqwest::header::USER_AGENT;
use serde_json::Value;
use url::Url;

use super::OpenAlexError;

pub const BASE_URL: &str = "https://api.openalex.org";

/// Identification sent in the `User-Agent` header of every request.
pub const CLIENT_TOKEN: &str = "openalex-mcp";

/// `User-Agent` value: the client token, plus the contact email when given.
pub fn user_agent(mailto: Option<&str>) -> String {
    match mailto {
        Some(email) => format!("{} ({})", CLIENT_TOKEN, email),
        None => CLIENT_TOKEN.to_string(),
    }
}

/// Thin HTTP boundary to the OpenAlex REST API.
///
/// One `fetch` is exactly one GET: no retries, no caching, and no timeout
/// beyond reqwest's defaults.
pub struct OpenAlexClient {
    client: reqwest::Client,
    base_url: Url,
}

impl OpenAlexClient {
    pub fn with_base_url(base_url: &str) -> Result<Self, OpenAlexError> {
        let invalid = |reason: String| OpenAlexError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".into()));
        }
        Ok(Self {
            client: http_client(reqwest::Client::builder())?,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segments...}?{query}`. Segments are percent-encoded; the
    /// query must already be encoded and is omitted when empty.
    pub fn resource_url(&self, segments: &[&str], query: &str) -> Result<Url, OpenAlexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OpenAlexError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        url.set_query((!query.is_empty()).then_some(query));
        Ok(url)
    }

    /// GET a resource and parse the body as JSON.
    pub async fn fetch(
        &self,
        segments: &[&str],
        query: &str,
        mailto: Option<&str>,
    ) -> Result<Value, OpenAlexError> {
        let url = self.resource_url(segments, query)?;
        tracing::debug!(%url, "GET");

        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent(mailto))
            .send()
            .await?;
        let status = resp.status();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "OpenAlex returned an error status");
            let body = resp.text().await.unwrap_or_else(|e| {
                tracing::warn!(status = status.as_u16(), "unreadable error body: {}", e);
                String::new()
            });
            return Err(OpenAlexError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Client setup failures are configuration errors, not transport ones.
fn http_client(builder: reqwest::ClientBuilder) -> Result<reqwest::Client, OpenAlexError> {
    builder.build().map_err(OpenAlexError::ClientSetup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_user_agent() {
        assert_eq!(user_agent(None), "openalex-mcp");
        assert_eq!(user_agent(Some("a@b.com")), "openalex-mcp (a@b.com)");
    }

    #[test]
    fn test_resource_url() {
        let client = OpenAlexClient::with_base_url(BASE_URL).unwrap();
        let url = client.resource_url(&["works", "W123"], "page=1").unwrap();
        assert_eq!(url.as_str(), "https://api.openalex.org/works/W123?page=1");

        let url = client.resource_url(&["authors"], "").unwrap();
        assert_eq!(url.as_str(), "https://api.openalex.org/authors");
    }

    #[test]
    fn test_resource_url_keeps_base_path_and_escapes_segments() {
        let client = OpenAlexClient::with_base_url("http://localhost:8080/proxy/").unwrap();
        let url = client.resource_url(&["works", "a/b c"], "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/works/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = OpenAlexClient::with_base_url("not a url").err().unwrap();
        assert_eq!(err.kind(), "configuration");
        assert!(OpenAlexClient::with_base_url("mailto:x@y.com").is_err());
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/works")
                .query_param("search", "test")
                .header("user-agent", "openalex-mcp");
            then.status(200).json_body(json!({"results": [], "meta": {"count": 0}}));
        });

        let client = OpenAlexClient::with_base_url(&server.base_url()).unwrap();
        let body = client.fetch(&["works"], "search=test", None).await.unwrap();

        mock.assert();
        assert_eq!(body["meta"]["count"], 0);
    }

    #[tokio::test]
    async fn test_fetch_http_error_keeps_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/works/invalid");
            then.status(503).body("upstream busy");
        });

        let client = OpenAlexClient::with_base_url(&server.base_url()).unwrap();
        let err = client.fetch(&["works", "invalid"], "", None).await.unwrap_err();

        assert_eq!(err.status_code(), Some(503));
        assert!(matches!(err, OpenAlexError::Http { ref body, .. } if body == "upstream busy"));
    }

    #[tokio::test]
    async fn test_fetch_non_json_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/works");
            then.status(200).body("<html>maintenance</html>");
        });

        let client = OpenAlexClient::with_base_url(&server.base_url()).unwrap();
        let err = client.fetch(&["works"], "", None).await.unwrap_err();

        assert!(matches!(err, OpenAlexError::Decode(_)));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_client_setup_failure_is_configuration() {
        // The default native-tls backend cannot enforce a TLS 1.3 floor.
        let builder = reqwest::Client::builder().min_tls_version(reqwest::tls::Version::TLS_1_3);
        let err = http_client(builder).unwrap_err();

        assert!(matches!(err, OpenAlexError::ClientSetup(_)));
        assert_eq!(err.kind(), "configuration");
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_fetch_truncated_error_body_keeps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 502 Bad Gateway\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
        });

        let client = OpenAlexClient::with_base_url(&format!("http://{}", addr)).unwrap();
        let err = client.fetch(&["works"], "", None).await.unwrap_err();

        assert_eq!(err.kind(), "http");
        assert_eq!(err.status_code(), Some(502));
        assert!(matches!(err, OpenAlexError::Http { ref body, .. } if body.is_empty()));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Port 1 is reserved and nothing listens on it.
        let client = OpenAlexClient::with_base_url("http://127.0.0.1:1").unwrap();
        let err = client.fetch(&["works"], "", None).await.unwrap_err();

        assert!(matches!(err, OpenAlexError::Transport(_)));
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.status_code(), None);
    }
}
