//! Row and payload types for the four storefront entity kinds
//!
//! Rows come back from the table store with store-assigned `id`,
//! `created_at`, and owner `user_id`; the `*Input` types are what the client
//! is allowed to send, which never includes any of those.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A row kind stored in one of the four entity tables
pub trait Entity: DeserializeOwned + Serialize + Clone {
    /// The table this entity lives in
    const TABLE: &'static str;

    /// The store-assigned row id
    fn id(&self) -> &str;
}

/// Product category, as offered by the product form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ebook,
    Course,
    Software,
    Template,
    Other,
}

impl Category {
    /// Canonical column value for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ebook => "ebook",
            Category::Course => "course",
            Category::Software => "software",
            Category::Template => "template",
            Category::Other => "other",
        }
    }

    /// Parse a stored category value; anything unrecognized folds to `Other`
    pub fn parse(value: &str) -> Self {
        match value {
            "ebook" => Category::Ebook,
            "course" => Category::Course,
            "software" => Category::Software,
            "template" => Category::Template,
            _ => Category::Other,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Ebook
    }
}

/// Membership billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Weekly,
    Yearly,
}

impl Default for BillingCycle {
    fn default() -> Self {
        BillingCycle::Monthly
    }
}

/// A digital product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub category: Option<String>,
    pub file_url: Option<String>,
    pub download_limit: i32,
    #[serde(default)]
    pub download_count: i32,
    pub license_key: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    const TABLE: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for creating or updating a product
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub download_limit: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
}

/// A customer row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Legacy single-field name; rows created before the first/last split
    /// still carry it
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Customer {
    const TABLE: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for creating or updating a customer
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A membership tier row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    #[serde(default)]
    pub features: Vec<String>,
    pub max_members: Option<i32>,
    #[serde(default)]
    pub member_count: i32,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Membership {
    const TABLE: &'static str = "memberships";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for creating or updating a membership tier
#[derive(Debug, Clone, Default, Serialize)]
pub struct MembershipInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub billing_cycle: BillingCycle,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_members: Option<i32>,
}

/// A sale row. Sales are immutable audit records; the client only ever
/// creates and reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub user_id: String,
    /// Weak reference; the product may have been deleted since
    pub product_id: Option<String>,
    /// Weak reference; the customer may have been deleted since
    pub customer_id: Option<String>,
    /// Denormalized product name captured at sale time
    pub product_name: Option<String>,
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// The sale amount, treating a missing value as zero
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or_default()
    }
}

impl Entity for Sale {
    const TABLE: &'static str = "sales";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for recording a sale
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaleInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}
