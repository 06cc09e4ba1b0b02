//! The entity store: four owner-scoped collections kept in sync with the
//! remote table store
//!
//! All mutations go through the store; consumers only ever read the
//! collections through slice accessors. After every successful write the
//! affected collection is patched from the rows the store returned, never
//! from the client's own payload, so default values and trigger-computed
//! columns can't silently diverge.

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::config::ClientOptions;
use crate::entities::{
    Customer, CustomerInput, Entity, Membership, MembershipInput, Product, ProductInput, Sale,
    SaleInput,
};
use crate::error::Error;
use crate::session::SessionClient;
use crate::stats;
use crate::table::TableClient;

/// A payload wrapped with the owning user id.
///
/// Every insert goes through this, so a row can never be written without
/// owner scoping.
#[derive(Serialize)]
struct OwnedRow<'a, T: Serialize> {
    #[serde(flatten)]
    input: &'a T,
    user_id: &'a str,
}

/// In-memory mirror of the current user's four entity collections
pub struct EntityStore {
    url: String,
    key: String,
    http_client: Client,
    session: SessionClient,
    options: ClientOptions,

    /// The user the collections currently belong to
    active_user: Option<String>,

    /// True while a bulk reload is outstanding
    loading: bool,

    products: Vec<Product>,
    customers: Vec<Customer>,
    memberships: Vec<Membership>,
    sales: Vec<Sale>,
}

impl EntityStore {
    /// Create a new, empty EntityStore
    pub(crate) fn new(
        url: &str,
        key: &str,
        http_client: Client,
        session: SessionClient,
        options: ClientOptions,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            session,
            options,
            active_user: None,
            loading: false,
            products: Vec::new(),
            customers: Vec::new(),
            memberships: Vec::new(),
            sales: Vec::new(),
        }
    }

    fn table(&self, table: &str) -> TableClient {
        TableClient::new(
            &self.url,
            &self.key,
            table,
            self.http_client.clone(),
            self.session.access_token(),
        )
    }

    fn current_user(&self) -> Result<String, Error> {
        self.session.user_id().ok_or(Error::NotAuthenticated)
    }

    // Remote operations, generic over the entity kind. Writes are scoped by
    // both the row id and the owner column; a client-supplied id alone is
    // never trusted.

    async fn insert_rows<I, E>(&self, input: &I) -> Result<Vec<E>, Error>
    where
        I: Serialize,
        E: Entity,
    {
        let user_id = self.current_user()?;
        let rows = [OwnedRow {
            input,
            user_id: &user_id,
        }];
        self.table(E::TABLE).insert(&rows).execute::<Vec<E>>().await
    }

    async fn update_rows<I, E>(&self, id: &str, input: &I) -> Result<Vec<E>, Error>
    where
        I: Serialize,
        E: Entity,
    {
        let user_id = self.current_user()?;
        let table = self.table(E::TABLE);
        let mut builder = table.update(input);
        builder
            .eq("id", id)
            .eq(&self.options.owner_column, &user_id);
        builder.execute::<Vec<E>>().await
    }

    async fn delete_rows<E: Entity>(&self, id: &str) -> Result<(), Error> {
        let user_id = self.current_user()?;
        let table = self.table(E::TABLE);
        let mut builder = table.delete();
        builder
            .eq("id", id)
            .eq(&self.options.owner_column, &user_id);
        builder.execute_no_return().await
    }

    async fn load_rows<E: Entity>(&self, user_id: &str) -> Result<Vec<E>, Error> {
        let table = self.table(E::TABLE);
        let mut builder = table.select("*");
        builder
            .eq(&self.options.owner_column, user_id)
            .order("created_at", true);
        builder.execute::<E>().await
    }

    // Local collection patching. Append on insert (not replace, so a
    // concurrent reload is tolerated); replace in place on update to keep
    // insertion order.

    fn apply_insert<E: Entity>(collection: &mut Vec<E>, rows: Vec<E>) -> Result<E, Error> {
        let first = rows
            .first()
            .cloned()
            .ok_or_else(|| Error::store("insert returned no rows"))?;
        collection.extend(rows);
        Ok(first)
    }

    fn apply_update<E: Entity>(collection: &mut [E], id: &str, rows: Vec<E>) -> Result<E, Error> {
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::store("update matched no rows"))?;
        if let Some(slot) = collection.iter_mut().find(|row| row.id() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    // Products

    /// Create a product owned by the current user
    pub async fn add_product(&mut self, input: &ProductInput) -> Result<Product, Error> {
        let rows = self.insert_rows(input).await?;
        Self::apply_insert(&mut self.products, rows)
    }

    /// Update a product; the element keeps its position in the collection
    pub async fn update_product(&mut self, id: &str, input: &ProductInput) -> Result<Product, Error> {
        let rows = self.update_rows(id, input).await?;
        Self::apply_update(&mut self.products, id, rows)
    }

    /// Delete a product
    pub async fn delete_product(&mut self, id: &str) -> Result<(), Error> {
        self.delete_rows::<Product>(id).await?;
        self.products.retain(|product| product.id != id);
        Ok(())
    }

    // Customers

    /// Create a customer owned by the current user
    pub async fn add_customer(&mut self, input: &CustomerInput) -> Result<Customer, Error> {
        let rows = self.insert_rows(input).await?;
        Self::apply_insert(&mut self.customers, rows)
    }

    /// Update a customer; the element keeps its position in the collection
    pub async fn update_customer(
        &mut self,
        id: &str,
        input: &CustomerInput,
    ) -> Result<Customer, Error> {
        let rows = self.update_rows(id, input).await?;
        Self::apply_update(&mut self.customers, id, rows)
    }

    /// Delete a customer
    pub async fn delete_customer(&mut self, id: &str) -> Result<(), Error> {
        self.delete_rows::<Customer>(id).await?;
        self.customers.retain(|customer| customer.id != id);
        Ok(())
    }

    // Memberships

    /// Create a membership tier owned by the current user
    pub async fn add_membership(&mut self, input: &MembershipInput) -> Result<Membership, Error> {
        let rows = self.insert_rows(input).await?;
        Self::apply_insert(&mut self.memberships, rows)
    }

    /// Update a membership tier; the element keeps its position
    pub async fn update_membership(
        &mut self,
        id: &str,
        input: &MembershipInput,
    ) -> Result<Membership, Error> {
        let rows = self.update_rows(id, input).await?;
        Self::apply_update(&mut self.memberships, id, rows)
    }

    /// Delete a membership tier
    pub async fn delete_membership(&mut self, id: &str) -> Result<(), Error> {
        self.delete_rows::<Membership>(id).await?;
        self.memberships.retain(|membership| membership.id != id);
        Ok(())
    }

    // Sales. Immutable audit records: create and read only.

    /// Record a sale for the current user
    pub async fn add_sale(&mut self, input: &SaleInput) -> Result<Sale, Error> {
        let rows = self.insert_rows(input).await?;
        Self::apply_insert(&mut self.sales, rows)
    }

    // Synchronization

    /// Fetch all four collections for the current user, replacing the local
    /// state wholesale. On failure the prior collections are left in place.
    pub async fn reload(&mut self) -> Result<(), Error> {
        let user_id = self.current_user()?;

        self.loading = true;
        let result = self.load_all(&user_id).await;
        self.loading = false;
        result
    }

    async fn load_all(&mut self, user_id: &str) -> Result<(), Error> {
        let products = self.load_rows::<Product>(user_id).await?;
        let customers = self.load_rows::<Customer>(user_id).await?;
        let memberships = self.load_rows::<Membership>(user_id).await?;
        let sales = self.load_rows::<Sale>(user_id).await?;

        self.products = products;
        self.customers = customers;
        self.memberships = memberships;
        self.sales = sales;
        Ok(())
    }

    /// Reconcile the collections with the current session.
    ///
    /// When a user appears (or changes), the collections are reloaded; when
    /// the user becomes absent, they are cleared. A failed reload is logged
    /// and leaves the prior collections untouched; the store errors are not
    /// surfaced here because no form triggered them.
    pub async fn sync(&mut self) {
        match self.session.user_id() {
            Some(user_id) => {
                if self.active_user.as_deref() != Some(user_id.as_str()) {
                    self.active_user = Some(user_id);
                    if let Err(error) = self.reload().await {
                        warn!(%error, "failed to load user data");
                    }
                }
            }
            None => {
                self.active_user = None;
                self.clear();
            }
        }
    }

    fn clear(&mut self) {
        self.products.clear();
        self.customers.clear();
        self.memberships.clear();
        self.sales.clear();
    }

    // Read access

    /// True while a bulk reload is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The current user's products, in insertion order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The current user's customers, in insertion order
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// The current user's membership tiers, in insertion order
    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    /// The current user's sales, in insertion order
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    // Projection shortcuts over the current collections; see `stats` for
    // the full set.

    /// Purchase summary for one customer
    pub fn customer_stats(&self, customer_id: &str) -> stats::CustomerStats {
        stats::customer_stats(&self.sales, customer_id)
    }

    /// Sum of all sale amounts
    pub fn total_revenue(&self) -> Decimal {
        stats::total_revenue(&self.sales)
    }

    /// Revenue bucketed over the dashboard's standard windows
    pub fn revenue_summary(&self, now: DateTime<Utc>) -> stats::RevenueSummary {
        stats::revenue_summary(&self.sales, now)
    }

    /// Revenue aggregated by product category
    pub fn revenue_by_category(
        &self,
    ) -> std::collections::BTreeMap<crate::entities::Category, Decimal> {
        stats::revenue_by_category(&self.products, &self.sales)
    }
}
