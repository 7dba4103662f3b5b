//! Request parameters and the per-call request description.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::http::HttpMethod;

/// Relative path of the single JSON endpoint the API exposes.
pub const DEFAULT_PATH: &str = "api.json";

/// Number of times a request is re-issued after a 5xx response.
pub const DEFAULT_RETRIES: u32 = 3;

/// Query or form parameters for one request. Keys are unique; inserting an
/// existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for a call of the remote method `name`.
    pub fn method(name: &str) -> Self {
        Self::new().with("method", name)
    }

    pub fn insert(&mut self, key: &str, value: impl Display) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts `value` only when it is present and renders non-empty.
    pub fn insert_opt<V: Display>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.0.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Method, relative path, and parameters of one logical exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub params: Params,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, params: Params) -> Self {
        Self {
            method,
            path: DEFAULT_PATH.to_string(),
            params,
        }
    }

    pub fn get(params: Params) -> Self {
        Self::new(HttpMethod::Get, params)
    }

    pub fn post(params: Params) -> Self {
        Self::new(HttpMethod::Post, params)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}
