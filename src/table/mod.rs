//! Row-level CRUD against the hosted table store's REST API

mod query;

use reqwest::Client;
use serde::Serialize;

pub use query::*;

/// Client for operations on a single table
pub struct TableClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// The table name
    table: String,

    /// HTTP client
    client: Client,

    /// Bearer token for the active session, when one exists
    auth: Option<String>,
}

impl TableClient {
    /// Create a new TableClient
    pub(crate) fn new(
        url: &str,
        key: &str,
        table: &str,
        client: Client,
        auth: Option<String>,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            client,
            auth,
        }
    }

    /// Get the base URL for REST API requests
    fn get_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(
            self.get_url(),
            self.key.clone(),
            columns,
            self.client.clone(),
            self.auth.clone(),
        )
    }

    /// Insert rows into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(
            self.get_url(),
            self.key.clone(),
            values,
            self.client.clone(),
            self.auth.clone(),
        )
    }

    /// Update rows in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(
            self.get_url(),
            self.key.clone(),
            values,
            self.client.clone(),
            self.auth.clone(),
        )
    }

    /// Delete rows from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(
            self.get_url(),
            self.key.clone(),
            self.client.clone(),
            self.auth.clone(),
        )
    }
}
