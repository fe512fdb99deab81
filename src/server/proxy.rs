use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        HeaderMap, Uri,
        header::{
            CONNECTION, CONTENT_LENGTH, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE,
            TRAILER, TRANSFER_ENCODING, UPGRADE,
        },
    },
    response::Response,
};

use super::{AppError, ServerState};
use crate::config::ProxyConfig;
use crate::console::console;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Forwards requests under the proxy prefix to the upstream API, keeping
/// method, path and query intact.
pub struct DevProxy {
    client: reqwest::Client,
    target: String,
    change_origin: bool,
}

impl DevProxy {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.secure)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build proxy client")?;

        Ok(Self {
            client,
            target: config.target.trim_end_matches('/').to_string(),
            change_origin: config.change_origin,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn upstream_url(&self, uri: &Uri) -> String {
        let path = uri.path_and_query().map_or("/", |p| p.as_str());
        format!("{}{}", self.target, path)
    }

    pub async fn forward(&self, request: Request) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();
        let url = self.upstream_url(&parts.uri);
        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(CONTENT_LENGTH);
        if self.change_origin {
            // reqwest derives Host from the upstream URL
            headers.remove(HOST);
        }

        console().debug(&format!("proxy {} {}", parts.method, url));

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);
        response_headers.remove(CONTENT_LENGTH);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in [
        CONNECTION,
        PROXY_AUTHENTICATE,
        PROXY_AUTHORIZATION,
        TE,
        TRAILER,
        TRANSFER_ENCODING,
        UPGRADE,
    ] {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

pub async fn proxy_handler(
    State(state): State<ServerState>,
    request: Request,
) -> Result<Response, AppError> {
    state.proxy.forward(request).await
}
