//! Storedash Data Layer
//!
//! The data-access and state-synchronization layer for a digital-product
//! storefront dashboard. It talks to a hosted table store over its REST API,
//! scopes every row to the owning user, and mirrors the user's products,
//! customers, memberships, and sales in an in-memory [`EntityStore`].

pub mod config;
pub mod entities;
pub mod error;
pub mod fetch;
pub mod forms;
pub mod session;
pub mod stats;
pub mod store;
pub mod table;

use reqwest::Client;

use crate::config::ClientOptions;
use crate::session::SessionClient;
use crate::store::EntityStore;
use crate::table::TableClient;

pub(crate) const CLIENT_INFO: &str = "storedash/0.1.0";

/// The main entry point for the Storedash data layer
pub struct Storedash {
    /// The base URL for the project
    pub url: String,
    /// The anonymous API key for the project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Session client for authentication
    pub session: SessionClient,
    /// Client options
    pub options: ClientOptions,
}

impl Storedash {
    /// Create a new Storedash client
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL for your project
    /// * `key` - The anonymous API key for your project
    ///
    /// # Example
    ///
    /// ```
    /// use storedash::Storedash;
    ///
    /// let client = Storedash::new("https://your-project-url.example.co", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new Storedash client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use storedash::{Storedash, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_owner_column("user_id");
    /// let client = Storedash::new_with_options(
    ///     "https://your-project-url.example.co",
    ///     "your-anon-key",
    ///     options,
    /// );
    /// ```
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|_| Client::new());

        let session = SessionClient::new(url, key, http_client.clone());

        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            session,
            options,
        }
    }

    /// Get a reference to the session client for authentication
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Create a TableClient for row-level operations on a specific table
    ///
    /// # Example
    ///
    /// ```
    /// use storedash::Storedash;
    ///
    /// let client = Storedash::new("https://your-project-url.example.co", "your-anon-key");
    /// let query = client.table("products");
    /// ```
    pub fn table(&self, table: &str) -> TableClient {
        TableClient::new(
            &self.url,
            &self.key,
            table,
            self.http_client.clone(),
            self.session.access_token(),
        )
    }

    /// Create an EntityStore bound to this client's session.
    ///
    /// The store starts empty; call [`EntityStore::sync`] after sign-in to
    /// populate it.
    pub fn entity_store(&self) -> EntityStore {
        EntityStore::new(
            &self.url,
            &self.key,
            self.http_client.clone(),
            self.session.clone(),
            self.options.clone(),
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::Storedash;
    pub use crate::config::ClientOptions;
    pub use crate::entities::{
        BillingCycle, Category, Customer, CustomerInput, Membership, MembershipInput, Product,
        ProductInput, Sale, SaleInput,
    };
    pub use crate::error::Error;
    pub use crate::store::EntityStore;
}
