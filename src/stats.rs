//! Pure projections over the in-memory collections
//!
//! Everything here is a stateless linear scan, recomputed on every call so
//! it always reflects the latest collection contents. Nothing is cached.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::entities::{Category, Customer, Product, Sale};

/// Per-customer purchase summary
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStats {
    pub total_spent: Decimal,
    pub purchase_count: usize,
    pub last_purchase: Option<DateTime<Utc>>,
}

/// Summarize the sales belonging to one customer
pub fn customer_stats(sales: &[Sale], customer_id: &str) -> CustomerStats {
    let mut total_spent = Decimal::ZERO;
    let mut purchase_count = 0;
    let mut last_purchase: Option<DateTime<Utc>> = None;

    for sale in sales
        .iter()
        .filter(|sale| sale.customer_id.as_deref() == Some(customer_id))
    {
        total_spent += sale.amount_or_zero();
        purchase_count += 1;
        if last_purchase.map_or(true, |at| sale.created_at > at) {
            last_purchase = Some(sale.created_at);
        }
    }

    CustomerStats {
        total_spent,
        purchase_count,
        last_purchase,
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Resolve a customer's display name.
///
/// Fallback order: first + last, standalone name, first alone, last alone,
/// then the literal "Unknown Customer". Empty strings count as absent.
pub fn customer_name(customer: &Customer) -> String {
    match (present(&customer.first_name), present(&customer.last_name)) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (first, last) => present(&customer.name)
            .or(first)
            .or(last)
            .unwrap_or("Unknown Customer")
            .to_string(),
    }
}

/// Resolve a customer's display location: non-empty city/state joined with
/// ", ", falling back to country, then "-"
pub fn customer_location(customer: &Customer) -> String {
    let parts: Vec<&str> = [present(&customer.city), present(&customer.state)]
        .into_iter()
        .flatten()
        .collect();
    if !parts.is_empty() {
        return parts.join(", ");
    }
    present(&customer.country).unwrap_or("-").to_string()
}

/// Resolve a product name for display, e.g. on a sale line
pub fn product_name(products: &[Product], product_id: &str) -> String {
    products
        .iter()
        .find(|product| product.id == product_id)
        .map(|product| product.name.clone())
        .unwrap_or_else(|| "Unknown Product".to_string())
}

/// Sum of all sale amounts
pub fn total_revenue(sales: &[Sale]) -> Decimal {
    sales.iter().map(Sale::amount_or_zero).sum()
}

/// Revenue bucketed over the dashboard's standard windows
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSummary {
    pub total: Decimal,
    pub today: Decimal,
    pub this_week: Decimal,
    pub this_month: Decimal,
}

/// Bucket revenue by date windows relative to `now`
pub fn revenue_summary(sales: &[Sale], now: DateTime<Utc>) -> RevenueSummary {
    let today = now.date_naive();
    let week_ago = now - chrono::Duration::days(7);
    let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);

    let mut summary = RevenueSummary {
        total: Decimal::ZERO,
        today: Decimal::ZERO,
        this_week: Decimal::ZERO,
        this_month: Decimal::ZERO,
    };

    for sale in sales {
        let amount = sale.amount_or_zero();
        summary.total += amount;
        if sale.created_at.date_naive() == today {
            summary.today += amount;
        }
        if sale.created_at >= week_ago {
            summary.this_week += amount;
        }
        if sale.created_at >= month_ago {
            summary.this_month += amount;
        }
    }

    summary
}

/// One day's sales activity
#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: usize,
    pub revenue: Decimal,
}

/// Sales count and revenue for each of the trailing seven days, oldest first
pub fn daily_sales(sales: &[Sale], now: DateTime<Utc>) -> Vec<DailySales> {
    let today = now.date_naive();
    (0..7)
        .rev()
        .map(|back| {
            let date = today.checked_sub_days(Days::new(back)).unwrap_or(today);
            let mut count = 0;
            let mut revenue = Decimal::ZERO;
            for sale in sales {
                if sale.created_at.date_naive() == date {
                    count += 1;
                    revenue += sale.amount_or_zero();
                }
            }
            DailySales {
                date,
                sales: count,
                revenue,
            }
        })
        .collect()
}

/// Per-product sales performance
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPerformance {
    pub name: String,
    pub sales: usize,
    pub revenue: Decimal,
}

/// Sales count and revenue per product; products with no sales are omitted
pub fn product_performance(products: &[Product], sales: &[Sale]) -> Vec<ProductPerformance> {
    products
        .iter()
        .filter_map(|product| {
            let mut count = 0;
            let mut revenue = Decimal::ZERO;
            for sale in sales {
                if sale.product_id.as_deref() == Some(product.id.as_str()) {
                    count += 1;
                    revenue += sale.amount_or_zero();
                }
            }
            (count > 0).then(|| ProductPerformance {
                name: product.name.clone(),
                sales: count,
                revenue,
            })
        })
        .collect()
}

/// Revenue aggregated by product category.
///
/// Missing or unrecognized categories fold into `Category::Other`. Sales
/// referencing a product that no longer exists contribute nothing.
pub fn revenue_by_category(products: &[Product], sales: &[Sale]) -> BTreeMap<Category, Decimal> {
    let mut revenue = BTreeMap::new();
    for product in products {
        let category = Category::parse(product.category.as_deref().unwrap_or(""));
        let product_revenue: Decimal = sales
            .iter()
            .filter(|sale| sale.product_id.as_deref() == Some(product.id.as_str()))
            .map(Sale::amount_or_zero)
            .sum();
        *revenue.entry(category).or_insert(Decimal::ZERO) += product_revenue;
    }
    revenue
}

/// Mean sale amount, zero when there are no sales
pub fn average_order_value(sales: &[Sale]) -> Decimal {
    if sales.is_empty() {
        return Decimal::ZERO;
    }
    total_revenue(sales) / Decimal::from(sales.len() as u64)
}

/// Sales per customer as a percentage, zero when there are no customers
pub fn conversion_rate(sales: &[Sale], customers: &[Customer]) -> f64 {
    if customers.is_empty() {
        return 0.0;
    }
    (sales.len() as f64 / customers.len() as f64) * 100.0
}

/// The `limit` most recent sales, newest first
pub fn recent_sales<'a>(sales: &'a [Sale], limit: usize) -> Vec<&'a Sale> {
    let mut ordered: Vec<&Sale> = sales.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.truncate(limit);
    ordered
}
