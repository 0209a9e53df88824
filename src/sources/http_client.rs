use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

/// Thin reqwest wrapper shared by the API and static-page adapters.
///
/// One attempt per call; failures surface straight to the caller.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// GET a URL and return the body as text. Non-2xx is `SourceUnavailable`.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get_text_with_headers(url, HeaderMap::new()).await
    }

    pub async fn get_text_with_headers(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let resp = self.inner.get(url).headers(headers).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::unavailable(format!("timed out requesting {}", url))
            } else {
                FetchError::unavailable(format!("request to {} failed: {}", url, e))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("{} answered HTTP {}", url, status);
            return Err(FetchError::unavailable(format!("HTTP {} from {}", status, url)));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::unavailable(format!("failed to read body from {}: {}", url, e)))
    }
}

/// Build a single-entry header map, rejecting values reqwest would refuse.
pub fn single_header(name: &'static str, value: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| FetchError::unavailable(format!("invalid value for header {}", name)))?;
    value.set_sensitive(true);
    headers.insert(HeaderName::from_static(name), value);
    Ok(headers)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection on a local port and answer it with `response`,
    /// or never answer when `None`. The handle yields the raw request head.
    pub(crate) async fn serve_once(response: Option<String>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            match response {
                Some(r) => sock.write_all(r.as_bytes()).await.unwrap(),
                None => std::future::pending::<()>().await,
            }
            String::from_utf8_lossy(&head).into_owned()
        });
        (url, handle)
    }

    pub(crate) fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[tokio::test]
    async fn test_get_text_ok() {
        let (url, server) = serve_once(Some(http_response("200 OK", "<html></html>"))).await;
        let client = HttpClient::new("fixture-bot-test", 5).unwrap();
        assert_eq!(client.get_text(&url).await.unwrap(), "<html></html>");
        assert!(server.await.unwrap().starts_with("GET / HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_unavailable() {
        let (url, _server) = serve_once(Some(http_response("503 Service Unavailable", ""))).await;
        let client = HttpClient::new("fixture-bot-test", 5).unwrap();
        let err = client.get_text(&url).await.unwrap_err();
        assert!(matches!(&err, FetchError::SourceUnavailable(m) if m.contains("503")), "{err}");
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_unavailable() {
        let (url, _server) = serve_once(None).await;
        let client = HttpClient::new("fixture-bot-test", 1).unwrap();
        let err = client.get_text(&url).await.unwrap_err();
        assert!(matches!(&err, FetchError::SourceUnavailable(m) if m.contains("timed out")), "{err}");
    }

    #[tokio::test]
    async fn test_refused_connection_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);
        let client = HttpClient::new("fixture-bot-test", 5).unwrap();
        assert!(matches!(client.get_text(&url).await, Err(FetchError::SourceUnavailable(_))));
    }

    #[test]
    fn test_single_header() {
        let h = single_header("x-auth-token", "abc").unwrap();
        assert_eq!(h.get("X-Auth-Token").unwrap(), "abc");
    }

    #[test]
    fn test_single_header_rejects_newlines() {
        assert!(single_header("x-auth-token", "a\nb").is_err());
    }
}
