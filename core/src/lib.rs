//! Blocking client for the Phish.net API.
//!
//! # Overview
//! Every remote method is reached through one JSON endpoint (`api.json`)
//! selected by a `method` parameter. The client builds those parameter sets,
//! adds the API version and key, retries 5xx responses a bounded number of
//! times, and returns the decoded JSON as `serde_json::Value`.
//!
//! # Design
//! - `Executor` owns the transport and knows nothing about endpoints. It
//!   classifies responses and runs the retry loop.
//! - `PhishNetClient` wraps the executor with session state (the authorized
//!   user) and one method per remote endpoint. Guards (API key, authorized
//!   user) and argument validation run before any request is built.
//! - Authorization negotiation (`authorize`, `resolve_token`) lives in
//!   `auth`.
//! - I/O goes through the `Transport` trait; `UreqTransport` is the default.
//!
//! ```no_run
//! use phishnet_core::{ClientConfig, PhishNetClient};
//!
//! let mut client = PhishNetClient::new(ClientConfig::new().api_key("my-key"));
//! client.authorize("fluffhead", Some("password"))?;
//! client.user_shows_rate("1997-11-22", 5)?;
//! # Ok::<(), phishnet_core::ApiError>(())
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod http;
pub mod request;
pub mod types;

pub use auth::{is_success, Authorization};
pub use client::PhishNetClient;
pub use config::ClientConfig;
pub use endpoint::{Endpoint, Guard};
pub use error::ApiError;
pub use executor::Executor;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use request::{Params, RequestSpec, DEFAULT_PATH, DEFAULT_RETRIES};
pub use types::{parse_date, IdList, Rating, ShowDate, ShowQuery};
