//! Auth configuration types

use serde::{Deserialize, Serialize};

/// How credentials are attached to requests (as configured by the user)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// HTTP Basic authentication
    #[default]
    Basic,
    /// `consumer_key` / `consumer_secret` query parameters
    QueryString,
}

/// Authentication configuration resolved from the tap config
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Consumer key
        username: String,
        /// Consumer secret
        password: String,
    },

    /// Credentials passed as query parameters
    QueryString {
        /// Consumer key
        consumer_key: String,
        /// Consumer secret
        consumer_secret: String,
    },
}

impl AuthConfig {
    /// Build an auth config from a key/secret pair and the configured method
    pub fn from_credentials(
        method: AuthMethod,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        match method {
            AuthMethod::Basic => Self::Basic {
                username: key.into(),
                password: secret.into(),
            },
            AuthMethod::QueryString => Self::QueryString {
                consumer_key: key.into(),
                consumer_secret: secret.into(),
            },
        }
    }

    /// Check whether any credentials are attached
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Secrets never reach the logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::QueryString { consumer_key, .. } => f
                .debug_struct("QueryString")
                .field("consumer_key", consumer_key)
                .field("consumer_secret", &"***")
                .finish(),
        }
    }
}
