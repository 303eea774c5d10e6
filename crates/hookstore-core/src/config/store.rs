//! Document-store connection configuration.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Connection settings for the document-store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend provider: currently only `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Server host name.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name appended to the connection URL.
    #[serde(default)]
    pub database: Option<String>,
    /// Username for authentication.
    #[serde(default)]
    pub user: Option<String>,
    /// Password for authentication. Only used together with `user`.
    #[serde(default)]
    pub password: Option<String>,
}

impl StoreConfig {
    /// Build the `mongodb://` connection URL for these settings.
    ///
    /// Credentials are only included when both `user` and `password` are set,
    /// and are percent-encoded.
    pub fn connection_url(&self) -> String {
        let auth = match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!(
                "{}:{}@",
                utf8_percent_encode(user, NON_ALPHANUMERIC),
                utf8_percent_encode(password, NON_ALPHANUMERIC)
            ),
            _ => String::new(),
        };
        let database = self
            .database
            .as_deref()
            .map(|db| format!("/{db}"))
            .unwrap_or_default();

        format!("mongodb://{auth}{}:{}{database}", self.host, self.port)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            host: default_host(),
            port: default_port(),
            database: None,
            user: None,
            password: None,
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    27017
}
