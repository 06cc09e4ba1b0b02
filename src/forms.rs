//! Client-side parsing of raw form input
//!
//! Forms collect everything as text; these types turn that text into typed
//! payloads before anything is sent to the store. Unparseable numeric fields
//! surface as `Error::Validation` so the form can stay open and show the
//! message inline.

use rust_decimal::Decimal;

use crate::entities::{BillingCycle, Category, CustomerInput, MembershipInput, ProductInput};
use crate::error::Error;

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, Error> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| Error::validation(format!("{} must be a number", field)))
}

fn parse_optional_decimal(field: &str, raw: &str) -> Result<Option<Decimal>, Error> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(field, raw).map(Some)
}

fn parse_int(field: &str, raw: &str) -> Result<i32, Error> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| Error::validation(format!("{} must be a whole number", field)))
}

fn parse_optional_int(field: &str, raw: &str) -> Result<Option<i32>, Error> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_int(field, raw).map(Some)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw input from the product form
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub discount: String,
    pub category: Category,
    pub file_url: String,
    pub download_limit: String,
    pub license_key: String,
}

impl ProductForm {
    /// Parse the form into a submittable payload
    pub fn parse(&self) -> Result<ProductInput, Error> {
        Ok(ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price: parse_decimal("price", &self.price)?,
            discount: parse_optional_decimal("discount", &self.discount)?,
            category: self.category,
            file_url: non_empty(&self.file_url),
            download_limit: parse_int("download limit", &self.download_limit)?,
            license_key: non_empty(&self.license_key),
        })
    }
}

/// Raw input from the membership form
#[derive(Debug, Clone, Default)]
pub struct MembershipForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub billing_cycle: BillingCycle,
    /// One feature per line, as typed into the textarea
    pub features: String,
    pub max_members: String,
}

impl MembershipForm {
    /// Parse the form into a submittable payload.
    ///
    /// Features are split on newlines with blank lines dropped.
    pub fn parse(&self) -> Result<MembershipInput, Error> {
        Ok(MembershipInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price: parse_decimal("price", &self.price)?,
            billing_cycle: self.billing_cycle,
            features: self
                .features
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(String::from)
                .collect(),
            max_members: parse_optional_int("max members", &self.max_members)?,
        })
    }
}

/// Raw input from the customer form
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub notes: String,
}

impl CustomerForm {
    /// Parse the form into a submittable payload; empty fields become absent
    pub fn parse(&self) -> Result<CustomerInput, Error> {
        let email = non_empty(&self.email)
            .ok_or_else(|| Error::validation("email is required"))?;

        Ok(CustomerInput {
            first_name: non_empty(&self.first_name),
            last_name: non_empty(&self.last_name),
            email,
            phone: non_empty(&self.phone),
            address: non_empty(&self.address),
            city: non_empty(&self.city),
            state: non_empty(&self.state),
            zip_code: non_empty(&self.zip_code),
            country: non_empty(&self.country),
            notes: non_empty(&self.notes),
        })
    }
}
