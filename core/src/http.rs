//! HTTP transport types and the blocking transport used by the client.
//!
//! # Design
//! Requests and responses are plain data. The executor builds an
//! `HttpRequest`, hands it to a [`Transport`], and classifies the returned
//! `HttpResponse` itself, so status handling and retries never depend on the
//! transport's own error policy. `UreqTransport` is the production transport;
//! tests substitute scripted ones.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ApiError;

/// HTTP method for a request.
///
/// `Put` and `Delete` are representable so that callers passing them are
/// rejected with `UnsupportedMethod` rather than failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ApiError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// For GET the parameters travel in the query string, for POST in a
/// form-encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    /// Value of a parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data. The body is left undecoded.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Executes one HTTP exchange.
///
/// Implementations return any status code as a response; only failures below
/// HTTP (connection, DNS, TLS, timeout) are errors, reported as
/// `ApiError::Transport`.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// Blocking transport over a reusable `ureq::Agent`.
///
/// The agent keeps connections alive between calls. Status codes are never
/// turned into errors here; the executor classifies them.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// `timeout` applies to each attempt as a whole; `None` disables it.
    pub fn new(timeout: Option<Duration>, verify_tls: bool) -> Self {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!verify_tls)
            .build();
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .tls_config(tls)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let pairs = request
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()));

        let result = match request.method {
            HttpMethod::Get => self.agent.get(request.url.as_str()).query_pairs(pairs).call(),
            HttpMethod::Post => self.agent.post(request.url.as_str()).send_form(pairs),
            other => return Err(ApiError::UnsupportedMethod(other.to_string())),
        };
        let mut response = result.map_err(|e| ApiError::Transport(Box::new(e)))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(Box::new(e)))?;

        Ok(HttpResponse { status, body })
    }
}

/// In-memory transports for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned responses in order and records every request.
    ///
    /// Once the script is exhausted the last response repeats.
    #[derive(Default)]
    pub struct ScriptedTransport {
        script: RefCell<VecDeque<HttpResponse>>,
        last: RefCell<Option<HttpResponse>>,
        pub sent: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: impl IntoIterator<Item = (u16, &'static str)>) -> Self {
            let script = responses
                .into_iter()
                .map(|(status, body)| HttpResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                })
                .collect();
            Self {
                script: RefCell::new(script),
                ..Self::default()
            }
        }

        pub fn ok(body: &'static str) -> Self {
            Self::new([(200, body)])
        }

        /// A single response with a raw, possibly non-UTF-8 body.
        pub fn raw(status: u16, body: &[u8]) -> Self {
            let response = HttpResponse {
                status,
                body: body.to_vec(),
            };
            Self {
                script: RefCell::new(VecDeque::from([response])),
                ..Self::default()
            }
        }

        pub fn request_count(&self) -> usize {
            self.sent.borrow().len()
        }

        pub fn request(&self, index: usize) -> HttpRequest {
            self.sent.borrow()[index].clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request.clone());
            let next = self.script.borrow_mut().pop_front();
            match next {
                Some(response) => {
                    *self.last.borrow_mut() = Some(response.clone());
                    Ok(response)
                }
                None => self
                    .last
                    .borrow()
                    .clone()
                    .ok_or_else(|| ApiError::Transport("script exhausted".into())),
            }
        }
    }

    /// Fails every request as if the connection were refused.
    #[derive(Default)]
    pub struct RefusingTransport {
        pub attempts: RefCell<usize>,
    }

    impl Transport for RefusingTransport {
        fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            *self.attempts.borrow_mut() += 1;
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            Err(ApiError::Transport(Box::new(io)))
        }
    }
}
