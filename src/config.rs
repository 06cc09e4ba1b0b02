//! Configuration options for the Storedash client

use std::time::Duration;

/// Configuration options for the Storedash client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout applied to every remote call
    pub request_timeout: Option<Duration>,

    /// The column every row is owner-scoped by
    pub owner_column: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            owner_column: "user_id".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the owner-scoping column
    pub fn with_owner_column(mut self, value: &str) -> Self {
        self.owner_column = value.to_string();
        self
    }
}
