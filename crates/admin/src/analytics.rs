//! Sales and inventory rollups computed from fetched entity lists.
//!
//! All money is `Decimal`. A price that is present but not a decimal number
//! fails the whole computation with a data error instead of being skipped.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::shopify::{AdminShopifyError, Entity, SearchFilter, connection_nodes};

/// Products below this total inventory are "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of entries kept in the top-products list.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

const UNTITLED: &str = "Untitled";

// =============================================================================
// Period
// =============================================================================

/// How far back a sales report looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub days: u32,
}

impl Default for ReportPeriod {
    fn default() -> Self {
        Self { days: 30 }
    }
}

impl ReportPeriod {
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self { days }
    }

    /// Anchor the period at `now`.
    #[must_use]
    pub fn window(self, now: DateTime<Utc>) -> ReportWindow {
        let start_date = (now - Duration::days(i64::from(self.days))).date_naive();
        ReportWindow {
            days: self.days,
            start_date,
        }
    }
}

/// A period anchored to a calendar start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub days: u32,
    pub start_date: NaiveDate,
}

impl ReportWindow {
    /// `created_at:>=YYYY-MM-DD`
    #[must_use]
    pub fn filter(&self) -> SearchFilter {
        SearchFilter::new().created_after(self.start_date.format("%Y-%m-%d").to_string())
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAnalytics {
    pub period: ReportWindow,
    pub summary: SalesSummary,
    pub top_products: Vec<ProductSales>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_orders: usize,
    pub average_order_value: Decimal,
}

/// Line-item totals for one product title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub title: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

/// Roll up revenue and best sellers from a list of orders.
///
/// Revenue per product is keyed by line-item title. The top list is sorted
/// by revenue, descending, with ties kept in first-seen order.
///
/// # Errors
///
/// Returns `AdminShopifyError::Data` if an order has no total, any total,
/// unit price or quantity is not numeric, an order's line items were cut
/// short, or a sum overflows.
pub fn compute_sales_analytics(
    orders: &[Entity],
    period: ReportWindow,
) -> Result<SalesAnalytics, AdminShopifyError> {
    let mut total_revenue = Decimal::ZERO;
    let mut by_title: Vec<ProductSales> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for order in orders {
        let label = order.id().unwrap_or("order");
        let total = ["totalPrice", "totalPriceSet"]
            .iter()
            .find_map(|field| order.get(*field).and_then(|v| money_amount(v).transpose()))
            .transpose()?
            .ok_or_else(|| AdminShopifyError::Data(format!("{label} has no total price")))?;
        total_revenue = checked_add(total_revenue, total, "total revenue")?;

        let line_items = complete_nodes(order, "lineItems", label)?;

        for item in line_items {
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(UNTITLED);
            let quantity = integer_field(item, "quantity")?;
            let unit_price = ["originalUnitPrice", "originalUnitPriceSet", "price"]
                .iter()
                .find_map(|field| item.get(*field).and_then(|v| money_amount(v).transpose()))
                .transpose()?
                .ok_or_else(|| {
                    AdminShopifyError::Data(format!("line item `{title}` in {label} has no unit price"))
                })?;

            let slot = *index.entry(title.to_string()).or_insert_with(|| {
                by_title.push(ProductSales {
                    title: title.to_string(),
                    quantity: 0,
                    revenue: Decimal::ZERO,
                });
                by_title.len() - 1
            });
            let line_revenue = unit_price
                .checked_mul(Decimal::from(quantity))
                .ok_or_else(|| overflow(&format!("revenue of `{title}`")))?;
            let entry = &mut by_title[slot];
            entry.quantity = entry
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| overflow(&format!("quantity of `{title}`")))?;
            entry.revenue = checked_add(entry.revenue, line_revenue, "product revenue")?;
        }
    }

    by_title.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    by_title.truncate(TOP_PRODUCTS_LIMIT);

    let total_orders = orders.len();
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        total_revenue
            .checked_div(Decimal::from(total_orders))
            .ok_or_else(|| overflow("average order value"))?
    };

    Ok(SalesAnalytics {
        period,
        summary: SalesSummary {
            total_revenue,
            total_orders,
            average_order_value,
        },
        top_products: by_title,
    })
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub summary: InventorySummary,
    pub low_stock_products: Vec<StockLevel>,
    pub out_of_stock_products: Vec<StockLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub total_inventory_value: Decimal,
}

/// A product listed in a stock bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub id: Option<String>,
    pub title: String,
    pub total_inventory: i64,
}

/// Bucket products by stock level and value the inventory on hand.
///
/// A product is low stock when its total inventory is below
/// [`LOW_STOCK_THRESHOLD`] and out of stock when it is zero or less; an
/// out-of-stock product is in both lists. Inventory value sums each
/// variant's price times that variant's own quantity.
///
/// # Errors
///
/// Returns `AdminShopifyError::Data` if a quantity is not an integer, a
/// variant price is missing or not numeric, a product's variants were cut
/// short, or the inventory value overflows.
pub fn compute_inventory_report(products: &[Entity]) -> Result<InventoryReport, AdminShopifyError> {
    let mut low_stock = Vec::new();
    let mut out_of_stock = Vec::new();
    let mut total_inventory_value = Decimal::ZERO;

    for product in products {
        let title = product.str_field("title").unwrap_or(UNTITLED);
        let total_inventory = product
            .get("totalInventory")
            .map(|v| integer_value(v, "totalInventory"))
            .transpose()?
            .flatten()
            .unwrap_or(0);

        let label = product.id().unwrap_or(title);
        let variants = complete_nodes(product, "variants", label)?;
        for variant in variants {
            let quantity = integer_field(variant, "inventoryQuantity")?;
            let price = variant
                .get("price")
                .and_then(|v| money_amount(v).transpose())
                .transpose()?
                .ok_or_else(|| {
                    AdminShopifyError::Data(format!("a variant of `{title}` has no price"))
                })?;
            let value = price
                .checked_mul(Decimal::from(quantity))
                .ok_or_else(|| overflow(&format!("inventory value of `{title}`")))?;
            total_inventory_value = checked_add(total_inventory_value, value, "inventory value")?;
        }

        if total_inventory < LOW_STOCK_THRESHOLD {
            let level = StockLevel {
                id: product.id().map(String::from),
                title: title.to_string(),
                total_inventory,
            };
            if total_inventory <= 0 {
                out_of_stock.push(level.clone());
            }
            low_stock.push(level);
        }
    }

    Ok(InventoryReport {
        summary: InventorySummary {
            total_products: products.len(),
            low_stock_products: low_stock.len(),
            out_of_stock_products: out_of_stock.len(),
            total_inventory_value,
        },
        low_stock_products: low_stock,
        out_of_stock_products: out_of_stock,
    })
}

// =============================================================================
// Field parsing
// =============================================================================

/// Read a money value: a decimal string, a JSON number, or an object
/// carrying one under `amount` or `shopMoney`. `Ok(None)` for null.
fn money_amount(value: &Value) -> Result<Option<Decimal>, AdminShopifyError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|_| AdminShopifyError::Data(format!("invalid price `{s}`"))),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map(Some)
            .map_err(|_| AdminShopifyError::Data(format!("invalid price `{n}`"))),
        Value::Object(fields) => match fields.get("shopMoney").or_else(|| fields.get("amount")) {
            Some(inner) => money_amount(inner),
            None => Err(AdminShopifyError::Data(
                "money object has no `amount`".to_string(),
            )),
        },
        other => Err(AdminShopifyError::Data(format!(
            "expected a price, got {}",
            crate::shopify::types::json_type(other)
        ))),
    }
}

/// Nodes of a nested connection on `parent`.
///
/// A connection whose `pageInfo.hasNextPage` is true was cut short by the
/// nested page size, so totals computed from it would be wrong.
fn complete_nodes<'a>(
    parent: &'a Entity,
    field: &str,
    label: &str,
) -> Result<Vec<&'a Value>, AdminShopifyError> {
    let Some(connection) = parent.get(field) else {
        return Ok(Vec::new());
    };
    let truncated = connection
        .get("pageInfo")
        .and_then(|p| p.get("hasNextPage"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if truncated {
        return Err(AdminShopifyError::Data(format!(
            "{label} has more {field} than a single page returns"
        )));
    }
    Ok(connection_nodes(connection).unwrap_or_default())
}

fn checked_add(total: Decimal, amount: Decimal, what: &str) -> Result<Decimal, AdminShopifyError> {
    total.checked_add(amount).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> AdminShopifyError {
    AdminShopifyError::Data(format!("{what} overflows the decimal range"))
}

/// Integer field of a nested JSON object; missing or null reads as zero.
fn integer_field(object: &Value, field: &str) -> Result<i64, AdminShopifyError> {
    object
        .get(field)
        .map(|v| integer_value(v, field))
        .transpose()
        .map(|v| v.flatten().unwrap_or(0))
}

fn integer_value(value: &Value, field: &str) -> Result<Option<i64>, AdminShopifyError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| AdminShopifyError::Data(format!("`{field}` is not an integer: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AdminShopifyError::Data(format!("`{field}` is not an integer: {s}"))),
        other => Err(AdminShopifyError::Data(format!(
            "`{field}` is not an integer: got {}",
            crate::shopify::types::json_type(other)
        ))),
    }
}
