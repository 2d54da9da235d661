//! The shared HTTP plumbing behind every gateway client.

use lobbyforge_protocol::{Codec, ErrorBody, JsonCodec, ProtocolError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ApiError, GatewayConfig, GatewayError};

/// A `reqwest::Client` bound to one base URL.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct BaseClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    codec: JsonCodec,
}

impl BaseClient {
    /// Validates the base URL and builds the underlying HTTP client.
    ///
    /// # Errors
    /// `InvalidBaseUrl` unless the URL is absolute `http` or `https`.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| GatewayError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl(format!(
                "{base_url}: unsupported scheme {}",
                base.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url,
            base,
            codec: JsonCodec,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL's path. Each segment is
    /// percent-encoded on its own, so a `/` inside one stays inside it.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request to the base URL plus `segments` and decodes the
    /// answer.
    ///
    /// Returns `Ok(None)` for a success status with an empty body. Any
    /// non-2xx status becomes [`GatewayError::Api`] with the status kept
    /// as-is. Nothing is retried.
    pub async fn do_request<Req, Res>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Req>,
    ) -> Result<Option<Res>, GatewayError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let url = self.url_for(segments)?;
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, self.codec.content_type());
        if let Some(body) = body {
            request = request.body(self.codec.encode(body)?);
        }

        tracing::debug!(%method, %url, "gateway request");
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = self
                .codec
                .decode::<ErrorBody>(&bytes)
                .ok()
                .map(|body| body.message);
            let err = ApiError::new(status.as_u16(), message);
            tracing::warn!(%method, %url, status = err.status, message = %err.message, "gateway call failed");
            return Err(err.into());
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(self.codec.decode(&bytes)?))
    }
}

/// Unwraps a payload the operation cannot do without.
pub(crate) fn required<T>(payload: Option<T>, operation: &str) -> Result<T, GatewayError> {
    payload.ok_or_else(|| {
        ProtocolError::InvalidMessage(format!("{operation}: empty response body")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = BaseClient::new(&GatewayConfig::new("http://127.0.0.1:8081/")).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8081");
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let err = BaseClient::new(&GatewayConfig::new("/api")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = BaseClient::new(&GatewayConfig::new("ftp://example.com")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_url_for_encodes_each_segment() {
        let client = BaseClient::new(&GatewayConfig::new("http://127.0.0.1:8081/")).unwrap();

        let url = client.url_for(&["api", "v1", "lobbies", "a/b c"]).unwrap();

        assert_eq!(url.path(), "/api/v1/lobbies/a%2Fb%20c");
    }

    #[test]
    fn test_url_for_keeps_base_path_prefix() {
        let client = BaseClient::new(&GatewayConfig::new("http://127.0.0.1:8081/rpc/")).unwrap();

        let url = client.url_for(&["api", "v1", "lobbies"]).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:8081/rpc/api/v1/lobbies");
    }

    #[test]
    fn test_required_payload() {
        assert_eq!(required(Some(3), "get").unwrap(), 3);
        let err = required::<u8>(None, "get lobby").unwrap_err();
        assert!(matches!(err, GatewayError::Protocol(_)));
        assert!(err.to_string().contains("get lobby"));
    }
}
