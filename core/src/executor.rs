//! Request execution with bounded retry.
//!
//! # Design
//! The executor knows nothing about individual endpoints. It adds the API
//! version and key to a copy of the caller's parameters, sends the request
//! through its [`Transport`], and classifies the response: 5xx is a
//! retryable `ServerError`, every other status is handed back for JSON
//! decoding. Retries are immediate and re-send the identical request.

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::request::RequestSpec;

#[derive(Debug)]
pub struct Executor<T> {
    transport: T,
    base_url: String,
    version: String,
    api_key: Option<String>,
}

impl<T: Transport> Executor<T> {
    /// `base_url` is expected to end with `/`; `ClientConfig` guarantees it.
    pub fn new(transport: T, base_url: String, version: String, api_key: Option<String>) -> Self {
        Self {
            transport,
            base_url,
            version,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `spec`, re-issuing it up to `retries` times after a 5xx
    /// response, and decodes the final body as JSON.
    ///
    /// Methods other than GET and POST fail with `UnsupportedMethod` before
    /// anything is sent. Transport failures are returned immediately.
    pub fn execute(&self, spec: &RequestSpec, retries: u32) -> Result<Value, ApiError> {
        if !matches!(spec.method, HttpMethod::Get | HttpMethod::Post) {
            return Err(ApiError::UnsupportedMethod(spec.method.to_string()));
        }

        let request = self.build_request(spec);
        let remote = spec.params.get("method").unwrap_or_default();
        let mut remaining = retries;

        let response = loop {
            debug!(
                http.method = %request.method,
                http.url = %request.url,
                remote,
                remaining,
                "sending request"
            );
            match check_status(self.transport.send(&request)?) {
                Ok(response) => break response,
                Err(err) if err.is_retryable() && remaining > 0 => {
                    remaining -= 1;
                    warn!(remote, remaining, error = %err, "retrying after server error");
                }
                Err(err) => {
                    error!(remote, error = %err, "request failed");
                    return Err(err);
                }
            }
        };

        decode(&request.method, &spec.path, response)
    }

    /// Builds the wire request for `spec` with `api` and `apikey` added.
    pub fn build_request(&self, spec: &RequestSpec) -> HttpRequest {
        let mut params = spec.params.clone();
        params.insert("api", &self.version);
        if let Some(key) = self.api_key() {
            params.insert("apikey", key);
        }
        HttpRequest {
            method: spec.method,
            url: format!("{}{}", self.base_url, spec.path.trim_start_matches('/')),
            params: params.to_pairs(),
        }
    }
}

/// 5xx becomes `ServerError`; any other status passes through.
fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if (500..600).contains(&response.status) {
        return Err(ApiError::ServerError {
            status: response.status,
        });
    }
    Ok(response)
}

fn decode(method: &HttpMethod, path: &str, response: HttpResponse) -> Result<Value, ApiError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::NoResponse {
            method: method.to_string(),
            path: path.to_string(),
        });
    }
    Ok(serde_json::from_slice(&response.body)?)
}
