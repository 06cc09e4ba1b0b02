//! Query builders for TableClient

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::CLIENT_INFO;

/// Base query builder
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// Query parameters
    params: HashMap<String, String>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
        }
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &HashMap<String, String> {
        &self.params
    }
}

fn common_headers<'a>(fetch: FetchBuilder<'a>, key: &str, auth: &Option<String>) -> FetchBuilder<'a> {
    let fetch = fetch
        .header("apikey", key)
        .header("X-Client-Info", CLIENT_INFO);
    match auth {
        Some(token) => fetch.bearer_auth(token),
        None => fetch,
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    /// The base URL for the request
    url: String,

    /// The API key
    key: String,

    /// HTTP client
    client: Client,

    /// Bearer token, when a session is active
    auth: Option<String>,

    /// Query builder
    query: QueryBuilder,
}

impl SelectBuilder {
    /// Create a new SelectBuilder
    pub fn new(url: String, key: String, columns: &str, client: Client, auth: Option<String>) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);

        Self {
            url,
            key,
            client,
            auth,
            query,
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("eq.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Filter rows where column does not equal a value
    pub fn neq<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("neq.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Filter rows where column is greater than a value
    pub fn gt<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("gt.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("gte.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Filter rows where column is less than a value
    pub fn lt<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("lt.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Filter rows where column is less than or equal to a value
    pub fn lte<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        let filter = format!("lte.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Filter rows where column is in a list of values
    pub fn in_list<T: ToString>(&mut self, column: &str, values: &[T]) -> &mut Self {
        let values_str: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let filter = format!("in.({})", values_str.join(","));
        self.query.add_param(column, &filter);
        self
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, count: i32) -> &mut Self {
        self.query.add_param("limit", &count.to_string());
        self
    }

    /// Skip a number of rows
    pub fn offset(&mut self, count: i32) -> &mut Self {
        self.query.add_param("offset", &count.to_string());
        self
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, ascending: bool) -> &mut Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.query.add_param("order", &format!("{}.{}", column, direction));
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = common_headers(Fetch::get(&self.client, &self.url), &self.key, &self.auth)
            .query(self.query.get_params().clone());

        let result = fetch.execute::<Vec<T>>().await?;
        Ok(result)
    }

    /// Execute the query and return the first row
    pub async fn execute_one<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        self.limit(1);

        let results = self.execute::<T>().await?;
        Ok(results.into_iter().next())
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    /// The base URL for the request
    url: String,

    /// The API key
    key: String,

    /// The values to insert
    values: T,

    /// HTTP client
    client: Client,

    /// Bearer token, when a session is active
    auth: Option<String>,

    /// Query builder
    query: QueryBuilder,
}

impl<T: Serialize> InsertBuilder<T> {
    /// Create a new InsertBuilder
    pub fn new(url: String, key: String, values: T, client: Client, auth: Option<String>) -> Self {
        Self {
            url,
            key,
            values,
            client,
            auth,
            query: QueryBuilder::new(),
        }
    }

    /// Execute the query and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let fetch = common_headers(Fetch::post(&self.client, &self.url), &self.key, &self.auth)
            .header("Prefer", "return=representation")
            .query(self.query.get_params().clone())
            .json(&self.values)?;

        let result = fetch.execute::<R>().await?;
        Ok(result)
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    /// The base URL for the request
    url: String,

    /// The API key
    key: String,

    /// The values to update
    values: T,

    /// HTTP client
    client: Client,

    /// Bearer token, when a session is active
    auth: Option<String>,

    /// Query builder
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    /// Create a new UpdateBuilder
    pub fn new(url: String, key: String, values: T, client: Client, auth: Option<String>) -> Self {
        Self {
            url,
            key,
            values,
            client,
            auth,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        let filter = format!("eq.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Execute the query and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let fetch = common_headers(Fetch::patch(&self.client, &self.url), &self.key, &self.auth)
            .header("Prefer", "return=representation")
            .query(self.query.get_params().clone())
            .json(&self.values)?;

        let result = fetch.execute::<R>().await?;
        Ok(result)
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    /// The base URL for the request
    url: String,

    /// The API key
    key: String,

    /// HTTP client
    client: Client,

    /// Bearer token, when a session is active
    auth: Option<String>,

    /// Query builder
    query: QueryBuilder,
}

impl DeleteBuilder {
    /// Create a new DeleteBuilder
    pub fn new(url: String, key: String, client: Client, auth: Option<String>) -> Self {
        Self {
            url,
            key,
            client,
            auth,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        let filter = format!("eq.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Execute the query without returning the deleted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        let fetch = common_headers(Fetch::delete(&self.client, &self.url), &self.key, &self.auth)
            .header("Prefer", "return=minimal")
            .query(self.query.get_params().clone());

        fetch.execute_no_content().await?;
        Ok(())
    }
}
