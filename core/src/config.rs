//! Client configuration.
//!
//! The access token is a static, pre-issued credential. Nothing here refreshes
//! or validates it; a bad token surfaces as a Graph `OAuthException` on the
//! first call.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";

pub const BASE_URL_VAR: &str = "GRAPH_API_URL";
pub const ACCESS_TOKEN_VAR: &str = "GRAPH_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub access_token: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            access_token: access_token.into(),
        }
    }

    /// Load from `GRAPH_API_URL` (optional) and `GRAPH_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup(ACCESS_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingVar(ACCESS_TOKEN_VAR))?;

        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(default_base_url);
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidVar {
                name: BASE_URL_VAR,
                reason: format!("{base_url:?} is not an http(s) URL"),
            });
        }

        Ok(Self {
            base_url,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_base_url() {
        let config = ClientConfig::from_lookup(lookup(&[(ACCESS_TOKEN_VAR, "someAccessToken")])).unwrap();
        assert_eq!(config, ClientConfig::new("someAccessToken"));
    }

    #[test]
    fn reads_base_url_override() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ACCESS_TOKEN_VAR, "t"),
            (BASE_URL_VAR, "http://127.0.0.1:3000"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ACCESS_TOKEN_VAR));

        let err = ClientConfig::from_lookup(lookup(&[(ACCESS_TOKEN_VAR, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ACCESS_TOKEN_VAR));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ACCESS_TOKEN_VAR, "t"),
            (BASE_URL_VAR, "graph.facebook.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: BASE_URL_VAR, .. }));
    }

    #[test]
    fn deserializes_with_default_base_url() {
        let config: ClientConfig = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
