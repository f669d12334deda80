//! Snapshot-server API client.
//!
//! A lightweight wrapper over `reqwest` for talking to the backup server's
//! REST endpoints. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Discovering credentials from `SNAPTTY_API_TOKEN` or the token file
//!   under the user's config directory
//! - Validating the server base URL for safety
//! - Typed methods for the endpoints the console consumes
//!
//! The primary entry point is [`ServerClient`]. Create one via
//! [`ServerClient::from_env`] (or [`ServerClient::new`] with an explicit
//! base URL) and call the endpoint methods directly.

use std::time::Duration;
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snaptty_types::{
    CreateSourceRequest, EstimateRequest, EstimateTaskRef, ResolvePathRequest, ResolvePathResponse,
    SourceDescriptor, SourcesResponse, TaskSummary,
};
use tracing::debug;

/// Environment variable overriding the server base URL.
pub const SERVER_ENV: &str = "SNAPTTY_SERVER";
/// Environment variable carrying the API bearer token.
pub const TOKEN_ENV: &str = "SNAPTTY_API_TOKEN";
/// Base URL used when neither a flag nor `SNAPTTY_SERVER` is set.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:51515";

/// Hostnames allowed to use plain HTTP; everything else must be HTTPS.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1"];

/// Thin wrapper around a configured `reqwest::Client` for server access.
///
/// The client pre-configures default headers and resolves request paths
/// against a validated base URL. Authentication is read from the
/// environment or the user's config directory.
#[derive(Debug, Clone)]
pub struct ServerClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl ServerClient {
    /// Construct a client for an explicit base URL, discovering the bearer
    /// token from the environment or the token file.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_token(base_url, discover_token())
    }

    /// Construct a client from `SNAPTTY_SERVER` (falling back to the local
    /// default) and discovered credentials.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(SERVER_ENV).unwrap_or_else(|_| DEFAULT_SERVER.into());
        Self::new(&base_url)
    }

    /// Construct a client with an explicit token (or none).
    pub fn with_token(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .context("API token contains invalid header characters")?;
            default_headers.insert(header::AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("snaptty/0.1; {}", env::consts::OS),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/v1/sources` — configured sources plus the local identity.
    pub async fn list_sources(&self) -> Result<SourcesResponse> {
        self.get("/api/v1/sources").await
    }

    /// `POST /api/v1/paths/resolve` — map free text to a source descriptor.
    pub async fn resolve_path(&self, path: &str) -> Result<SourceDescriptor> {
        let response: ResolvePathResponse = self
            .post("/api/v1/paths/resolve", &ResolvePathRequest { path: path.to_string() })
            .await?;
        Ok(response.source)
    }

    /// `POST /api/v1/estimate` — start an estimation task.
    pub async fn start_estimate(&self, request: &EstimateRequest) -> Result<EstimateTaskRef> {
        self.post("/api/v1/estimate", request).await
    }

    /// `POST /api/v1/sources` — register a source, optionally snapshotting
    /// immediately. The success payload carries nothing the console needs.
    pub async fn create_source(&self, request: &CreateSourceRequest) -> Result<()> {
        let response = self.build(reqwest::Method::POST, "/api/v1/sources").json(request).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// `GET /api/v1/tasks/{id}` — progress of a server task.
    pub async fn task_summary(&self, task_id: &str) -> Result<TaskSummary> {
        self.get(&format!("/api/v1/tasks/{task_id}")).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.build(reqwest::Method::GET, path).send().await?;
        let response = Self::check_status(response).await?;
        response.json().await.context("decode response body")
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.build(reqwest::Method::POST, path).json(body).send().await?;
        let response = Self::check_status(response).await?;
        response.json().await.context("decode response body")
    }

    fn build(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");
        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = if body.trim().is_empty() { String::new() } else { format!(": {}", body.trim()) };
        match status {
            StatusCode::UNAUTHORIZED => Err(anyhow!(
                "Unauthorized (401){detail}. Hint: set {TOKEN_ENV} or write the token file in your config directory"
            )),
            StatusCode::FORBIDDEN => Err(anyhow!(
                "Forbidden (403){detail}. Hint: the token lacks access to this server"
            )),
            _ => Err(anyhow!("server returned {status}{detail}")),
        }
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost`, `127.0.0.1`, or `::1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed = Url::parse(base).map_err(|e| anyhow!("Invalid server URL '{}': {}", base, e))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("server URL must include a host"))?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "server URL must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        ));
    }

    Ok(())
}

/// Read the bearer token from `SNAPTTY_API_TOKEN` or, failing that, the
/// `snaptty/token` file under the user's config directory.
fn discover_token() -> Option<String> {
    if let Ok(token) = env::var(TOKEN_ENV) {
        let token = token.trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    let path = dirs_next::config_dir()?.join("snaptty").join("token");
    let contents = fs::read_to_string(path).ok()?;
    let token = contents.trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_allows_plain_http() {
        assert!(validate_base_url("http://localhost:51515").is_ok());
        assert!(validate_base_url("http://127.0.0.1:51515").is_ok());
        assert!(validate_base_url("https://localhost").is_ok());
    }

    #[test]
    fn remote_hosts_require_https() {
        assert!(validate_base_url("https://backup.example.com").is_ok());
        let err = validate_base_url("http://backup.example.com").unwrap_err();
        assert!(err.to_string().contains("https"));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        assert!(validate_base_url("not a url").is_err());
        assert!(validate_base_url("file:///tmp").is_err());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = ServerClient::with_token("http://localhost:51515/", None).expect("client");
        assert_eq!(client.base_url(), "http://localhost:51515");
    }
}
