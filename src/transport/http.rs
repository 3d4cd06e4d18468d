// MIT License - Copyright (c) 2026 The dahua-cam Authors

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::config::{CamConfig, KeepAlivePolicy};
use crate::constants::CGI_PREFIX;
use crate::error::{CamError, Result};
use crate::transport::auth::Challenge;

/// Authenticated HTTP access to the camera's CGI endpoints.
///
/// Credentials are withheld from the first attempt and only sent in answer
/// to a 401 challenge. There is no retry at this layer.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_uri: String,
    username: String,
    password: String,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &CamConfig) -> Result<Self> {
        let client = build_client(config.connect_timeout(), &config.keep_alive)?;
        Ok(Self {
            client,
            base_uri: config.base_uri(),
            username: config.username.clone(),
            password: config.password.clone(),
            request_timeout: config.request_timeout(),
        })
    }

    /// Full URL of a CGI path, e.g. `magicBox.cgi?action=getMachineName`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_uri, CGI_PREFIX, path)
    }

    /// One-shot GET returning the body as text.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let response = self
            .get(path, None, Some(self.request_timeout), CamError::Request)
            .await?;
        response.text().await.map_err(CamError::Request)
    }

    /// One-shot GET returning the whole body as bytes.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .get(path, None, Some(self.request_timeout), CamError::Request)
            .await?;
        let body = response.bytes().await.map_err(CamError::Request)?;
        Ok(body.to_vec())
    }

    /// Open a long-lived response.
    ///
    /// Only the wait for response headers is bounded, by the request timeout;
    /// the body may stay open indefinitely. Transport failures are reported
    /// as [`CamError::Stream`], a device that never answers as
    /// [`CamError::StreamTimeout`].
    pub async fn open_stream(&self, path: &str, accept: &str) -> Result<Response> {
        let request = self.get(path, Some(accept), None, CamError::Stream);
        tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| {
                warn!(
                    "No response headers for {} within {:?}",
                    path, self.request_timeout
                );
                CamError::StreamTimeout {
                    path: path.to_string(),
                }
            })?
    }

    async fn get(
        &self,
        path: &str,
        accept: Option<&str>,
        timeout: Option<Duration>,
        wrap: fn(reqwest::Error) -> CamError,
    ) -> Result<Response> {
        let url = Url::parse(&self.url(path)).map_err(|e| CamError::Config {
            details: format!("invalid URL for {}: {}", path, e),
        })?;

        let response = self
            .build(url.clone(), accept, timeout, None)
            .send()
            .await
            .map_err(wrap)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response, path);
        }

        debug!("Challenge received for {}", path);
        let challenge = pick_challenge(&response)?;
        let authorization =
            challenge.authorization("GET", &request_uri(&url), &self.username, &self.password);

        let response = self
            .build(url, accept, timeout, Some(authorization))
            .send()
            .await
            .map_err(wrap)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Credentials rejected for {}", path);
            return Err(CamError::Unauthorized {
                path: path.to_string(),
            });
        }
        check_status(response, path)
    }

    fn build(
        &self,
        url: Url,
        accept: Option<&str>,
        timeout: Option<Duration>,
        authorization: Option<String>,
    ) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        request
    }
}

/// Build the HTTP client with TCP keep-alive probing on every socket.
pub fn build_client(connect_timeout: Duration, keep_alive: &KeepAlivePolicy) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .tcp_keepalive(keep_alive.idle())
        .tcp_keepalive_interval(keep_alive.interval())
        .tcp_keepalive_retries(keep_alive.retries)
        .build()
        .map_err(CamError::Request)
}

fn check_status(response: Response, path: &str) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(CamError::Status {
            status: response.status().as_u16(),
            path: path.to_string(),
        })
    }
}

/// Prefer a Digest challenge when the server offers several.
fn pick_challenge(response: &Response) -> Result<Challenge> {
    let challenges: Vec<Challenge> = response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Challenge::parse(v).ok())
        .collect();

    let digest = challenges
        .iter()
        .position(|c| matches!(c, Challenge::Digest(_)))
        .unwrap_or(0);
    challenges
        .into_iter()
        .nth(digest)
        .ok_or_else(|| CamError::Challenge {
            details: "401 without a usable WWW-Authenticate header".to_string(),
        })
}

/// Path and query as sent on the request line; the digest `uri` parameter.
fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
