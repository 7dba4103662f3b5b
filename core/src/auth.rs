//! Per-user authorization negotiation.
//!
//! # Design
//! A user grants an application write access once per API key. Resolving the
//! user's authkey is a three-way decision:
//! 1. the user already authorized this key → fetch the existing authkey;
//! 2. not authorized and a password is given → register and receive one;
//! 3. not authorized and no password → `MissingCredentials`.
//!
//! The session holds `Option<Authorization>`, so a username is never stored
//! without its authkey.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::client::PhishNetClient;
use crate::endpoint;
use crate::error::ApiError;
use crate::http::Transport;

/// A username and the authkey the API issued for it.
#[derive(Clone, PartialEq, Eq)]
pub struct Authorization {
    username: String,
    authkey: String,
}

impl Authorization {
    pub fn new(username: impl Into<String>, authkey: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authkey: authkey.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn authkey(&self) -> &str {
        &self.authkey
    }

    /// Both halves must be non-empty to act for the user.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.authkey.is_empty()
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("username", &self.username)
            .field("authkey", &"<redacted>")
            .finish()
    }
}

/// Reads the `success` flag of an API response.
///
/// The API is inconsistent about its type, so `"1"`, `1`, and `true` are all
/// success. Anything else, including a missing flag, is failure.
pub fn is_success(response: &Value) -> bool {
    match response.get("success") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.trim() == "1",
        _ => false,
    }
}

fn authkey_field(response: &Value) -> Result<String, ApiError> {
    match response.get("authkey") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ApiError::Decode(
            "successful response is missing \"authkey\"".to_string(),
        )),
    }
}

impl<T: Transport> PhishNetClient<T> {
    /// Whether `username` has granted write access to this API key.
    pub fn authorized_check(&self, username: &str) -> Result<bool, ApiError> {
        let response = self.call(&endpoint::AUTHORIZED_CHECK, |params| {
            Ok(params.with("username", username))
        })?;
        Ok(is_success(&response))
    }

    /// The authkey of a user who already authorized this API key, or `None`
    /// when the API reports it as unavailable.
    pub fn authkey_get(&self, username: &str) -> Result<Option<String>, ApiError> {
        let response = self.call(&endpoint::AUTHKEY_GET, |params| {
            Ok(params.with("username", username))
        })?;
        if !is_success(&response) {
            return Ok(None);
        }
        authkey_field(&response).map(Some)
    }

    /// Grants this API key write access for `username` and returns the
    /// issued authkey.
    pub fn api_authorize(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response = self.call(&endpoint::API_AUTHORIZE, |params| {
            Ok(params.with("username", username).with("passwd", password))
        })?;
        if !is_success(&response) {
            return Err(ApiError::AuthorizationDenied {
                username: username.to_string(),
            });
        }
        authkey_field(&response)
    }

    /// Resolves the authkey for `username` without touching the session.
    ///
    /// Returns `Ok(None)` when the user is authorized but the API will not
    /// hand out the existing authkey. An empty password counts as absent.
    pub fn resolve_token(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        self.require_api_key("resolve_token")?;

        if self.authorized_check(username)? {
            debug!(username, "user already authorized, fetching authkey");
            return self.authkey_get(username);
        }

        match password.filter(|p| !p.is_empty()) {
            None => Err(ApiError::MissingCredentials {
                username: username.to_string(),
            }),
            Some(password) => {
                debug!(username, "user not authorized, registering");
                self.api_authorize(username, password).map(Some)
            }
        }
    }

    /// Resolves the authkey for `username` and stores the pair in the
    /// session. Returns `false` if no authkey was available, in which case
    /// the session is left unauthorized.
    pub fn authorize(&mut self, username: &str, password: Option<&str>) -> Result<bool, ApiError> {
        match self.resolve_token(username, password)? {
            Some(authkey) => {
                info!(username, "authorized");
                self.set_authorization(Some(Authorization::new(username, authkey)));
                Ok(true)
            }
            None => {
                info!(username, "authkey not available");
                self.set_authorization(None);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::testing::ScriptedTransport;
    use crate::http::HttpMethod;

    fn client(transport: ScriptedTransport) -> PhishNetClient<ScriptedTransport> {
        PhishNetClient::with_transport(ClientConfig::new().api_key("KEY"), transport)
    }

    #[test]
    fn success_flag_accepts_every_truthy_encoding() {
        assert!(is_success(&json!({"success": "1"})));
        assert!(is_success(&json!({"success": 1})));
        assert!(is_success(&json!({"success": true})));
        assert!(!is_success(&json!({"success": "0"})));
        assert!(!is_success(&json!({"success": 0})));
        assert!(!is_success(&json!({"success": false})));
        assert!(!is_success(&json!({"success": null})));
        assert!(!is_success(&json!({"success": "yes"})));
        assert!(!is_success(&json!({})));
        assert!(!is_success(&json!([])));
    }

    #[test]
    fn authorized_user_gets_existing_authkey() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":"1"}"#),
            (200, r#"{"success":1,"authkey":"ABCDEF0123456789ABC"}"#),
        ]);
        let c = client(transport);
        let token = c.resolve_token("trey", None).unwrap();
        assert_eq!(token.as_deref(), Some("ABCDEF0123456789ABC"));

        let check = c.executor.transport().request(0);
        assert_eq!(check.param("method"), Some("pnet.api.authorized.check"));
        assert_eq!(check.param("username"), Some("trey"));
        let fetch = c.executor.transport().request(1);
        assert_eq!(fetch.method, HttpMethod::Get);
        assert_eq!(fetch.param("method"), Some("pnet.api.authkey.get"));
    }

    #[test]
    fn unavailable_authkey_is_a_sentinel_not_an_error() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":true}"#),
            (200, r#"{"success":"0"}"#),
        ]);
        let c = client(transport);
        assert_eq!(c.resolve_token("trey", Some("pw")).unwrap(), None);
        assert_eq!(c.executor.transport().request_count(), 2);
    }

    #[test]
    fn unauthorized_without_password_is_missing_credentials() {
        let c = client(ScriptedTransport::ok(r#"{"success":"0"}"#));
        let err = c.resolve_token("mike", None).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredentials { username } if username == "mike"));
        // Only the authorization check went out.
        assert_eq!(c.executor.transport().request_count(), 1);

        let err = c.resolve_token("mike", Some("")).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredentials { .. }));
    }

    #[test]
    fn unauthorized_with_password_registers() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":"0"}"#),
            (200, r#"{"success":"1","authkey":"0123456789ABCDEF012"}"#),
        ]);
        let c = client(transport);
        let token = c.resolve_token("page", Some("hunter2")).unwrap();
        assert_eq!(token.as_deref(), Some("0123456789ABCDEF012"));

        let register = c.executor.transport().request(1);
        assert_eq!(register.method, HttpMethod::Post);
        assert_eq!(register.param("method"), Some("pnet.api.authorize"));
        assert_eq!(register.param("passwd"), Some("hunter2"));
    }

    #[test]
    fn rejected_registration_is_authorization_denied() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":"0"}"#),
            (200, r#"{"success":"0","reason":"bad password"}"#),
        ]);
        let c = client(transport);
        let err = c.resolve_token("page", Some("wrong")).unwrap_err();
        assert!(matches!(err, ApiError::AuthorizationDenied { username } if username == "page"));
    }

    #[test]
    fn success_without_authkey_is_a_decode_error() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":"0"}"#),
            (200, r#"{"success":"1"}"#),
        ]);
        let c = client(transport);
        let err = c.resolve_token("page", Some("pw")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn negotiation_requires_an_api_key() {
        let transport = ScriptedTransport::ok(r#"{"success":"1"}"#);
        let c = PhishNetClient::with_transport(ClientConfig::new(), transport);
        let err = c.resolve_token("trey", Some("pw")).unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey { operation: "resolve_token" }));
        assert_eq!(c.executor.transport().request_count(), 0);
    }

    #[test]
    fn authorize_stores_username_and_authkey_together() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":"1"}"#),
            (200, r#"{"success":"1","authkey":"FEDCBA9876543210FED"}"#),
        ]);
        let mut c = client(transport);
        assert!(c.authorize("fish", None).unwrap());
        assert_eq!(c.username(), Some("fish"));
        assert_eq!(c.authkey(), Some("FEDCBA9876543210FED"));
    }

    #[test]
    fn authorize_clears_session_when_authkey_unavailable() {
        let transport = ScriptedTransport::new([
            (200, r#"{"success":"1"}"#),
            (200, r#"{"success":"0"}"#),
        ]);
        let config = ClientConfig::new()
            .api_key("KEY")
            .authorization("old", "OLDKEY");
        let mut c = PhishNetClient::with_transport(config, transport);
        assert!(!c.authorize("fish", None).unwrap());
        assert_eq!(c.username(), None);
        assert_eq!(c.authkey(), None);
    }

    #[test]
    fn failed_authorize_keeps_previous_session() {
        let config = ClientConfig::new()
            .api_key("KEY")
            .authorization("old", "OLDKEY");
        let mut c = PhishNetClient::with_transport(config, ScriptedTransport::ok(r#"{"success":"0"}"#));
        assert!(c.authorize("fish", None).is_err());
        assert_eq!(c.username(), Some("old"));
    }

    #[test]
    fn debug_output_redacts_authkey() {
        let auth = Authorization::new("fish", "SECRET");
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("fish"));
        assert!(!rendered.contains("SECRET"));
    }
}
