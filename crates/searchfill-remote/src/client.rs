use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use searchfill_core::{FetchRequest, RequestMethod, SuggestionSource};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};

// ─── SuggestionClient ─────────────────────────────────────────────────────────

/// Sends suggestion queries over HTTP and returns the parsed JSON body.
///
/// Query parameters travel as a URL query string for GET and as a
/// form-encoded body for POST.
pub struct SuggestionClient {
    client: reqwest::Client,
    base_url: String,
}

impl SuggestionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&RemoteConfig {
            base_url: base_url.to_string(),
            ..RemoteConfig::default()
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RemoteError::InvalidHeader(name.clone(), e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RemoteError::InvalidHeader(name.clone(), e.to_string()))?;
            headers.insert(header, value);
        }
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute endpoint for a configured `fill_url`.
    pub fn endpoint(&self, fill_url: &str) -> String {
        if fill_url.starts_with("http://") || fill_url.starts_with("https://") {
            return fill_url.to_string();
        }
        if fill_url.starts_with('/') {
            format!("{}{}", self.base_url, fill_url)
        } else {
            format!("{}/{}", self.base_url, fill_url)
        }
    }

    pub async fn query(&self, request: &FetchRequest) -> Result<Value> {
        let url = self.endpoint(&request.url);
        debug!(
            field = %request.field,
            generation = request.generation,
            method = ?request.method,
            "querying {url}"
        );
        let builder = match request.method {
            RequestMethod::Get => self.client.get(&url).query(&request.params),
            RequestMethod::Post => self.client.post(&url).form(&request.params),
        };
        let resp = builder.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(field = %request.field, status, "suggestion endpoint returned an error");
            return Err(RemoteError::ApiError(url, format!("HTTP {status}: {body}")));
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SuggestionSource for SuggestionClient {
    async fn fetch(&self, request: &FetchRequest) -> searchfill_core::Result<Value> {
        Ok(self.query(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use searchfill_core::{FillError, QueryParameters};
    use std::collections::BTreeMap;

    fn request(url: &str, method: RequestMethod, params: &[(&str, &str)]) -> FetchRequest {
        FetchRequest {
            field: "projectName".to_string(),
            generation: 1,
            url: url.to_string(),
            method,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<QueryParameters>(),
        }
    }

    #[test]
    fn test_endpoint_joins_relative_urls() {
        let client = SuggestionClient::new("http://ci.example.com/jenkins/").unwrap();
        assert_eq!(
            client.endpoint("/fill"),
            "http://ci.example.com/jenkins/fill"
        );
        assert_eq!(client.endpoint("fill"), "http://ci.example.com/jenkins/fill");
        assert_eq!(client.endpoint("https://other/x"), "https://other/x");
    }

    #[tokio::test]
    async fn test_get_sends_query_string() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/fillProjectNameItems")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("serverId".into(), "1".into()),
                Matcher::UrlEncoded("projectName".into(), "my proj".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok", "data": [{"name": "My Project"}]}"#)
            .create_async()
            .await;

        let client = SuggestionClient::new(&server.url()).unwrap();
        let body = client
            .query(&request(
                "/fillProjectNameItems",
                RequestMethod::Get,
                &[("serverId", "1"), ("projectName", "my proj")],
            ))
            .await
            .unwrap();

        assert_eq!(body["data"][0]["name"], "My Project");
    }

    #[tokio::test]
    async fn test_post_sends_form_body_and_headers() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/fill")
            .match_header("jenkins-crumb", "abc123")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("serverId".into(), "1".into()),
                Matcher::UrlEncoded("projectName".into(), "pr".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let config = RemoteConfig {
            base_url: server.url(),
            headers: BTreeMap::from([("Jenkins-Crumb".to_string(), "abc123".to_string())]),
            ..RemoteConfig::default()
        };
        let client = SuggestionClient::from_config(&config).unwrap();
        let body = client
            .query(&request(
                "/fill",
                RequestMethod::Post,
                &[("serverId", "1"), ("projectName", "pr")],
            ))
            .await
            .unwrap();

        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_transport_failure() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/fill")
            .with_status(400)
            .with_body("The project name must be at least 2 characters long")
            .create_async()
            .await;

        let client = SuggestionClient::new(&server.url()).unwrap();
        let err = client
            .fetch(&request("/fill", RequestMethod::Post, &[]))
            .await
            .unwrap_err();

        match err {
            FillError::Transport { url, message } => {
                assert!(url.ends_with("/fill"));
                assert!(message.starts_with("HTTP 400"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_parse_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/fill")
            .with_status(200)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let client = SuggestionClient::new(&server.url()).unwrap();
        let err = client
            .fetch(&request("/fill", RequestMethod::Get, &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, FillError::Parse(_)));
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let config = RemoteConfig {
            headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
            ..RemoteConfig::default()
        };
        assert!(matches!(
            SuggestionClient::from_config(&config),
            Err(RemoteError::InvalidHeader(..))
        ));
    }
}
