use serde_json::Value;

use crate::apis::client::BASE_URL;
use crate::apis::{OpenAlexClient, OpenAlexError};
use crate::schema::is_email;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// Contact email used for calls that do not pass their own `mailto`.
    pub default_mailto: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("OPENALEX_BASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| BASE_URL.to_string());

        let default_mailto = lookup("OPENALEX_EMAIL")
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .and_then(|email| {
                if is_email(&email) {
                    Some(email)
                } else {
                    tracing::warn!("Ignoring OPENALEX_EMAIL: {:?} is not an email address", email);
                    None
                }
            });

        Self { base_url, default_mailto }
    }

    pub fn build_client(&self) -> Result<OpenAlexClient, OpenAlexError> {
        OpenAlexClient::with_base_url(&self.base_url)
    }

    /// Insert the default `mailto` into a tool argument object that lacks one.
    pub fn apply_default_mailto(&self, args: &mut Value) {
        let (Some(email), Value::Object(map)) = (&self.default_mailto, args) else {
            return;
        };
        if !map.contains_key("mailto") {
            map.insert("mailto".into(), Value::String(email.clone()));
        }
    }

    pub fn polite_pool_note(&self) -> &'static str {
        if self.default_mailto.is_some() {
            "Polite pool email set"
        } else {
            "No email (limited rate)"
        }
    }
}
