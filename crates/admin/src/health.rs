//! Store health evaluation.
//!
//! Three read-only checks run in a fixed order: API reachability, inventory
//! levels and recent unfulfilled orders. Each check's failure is captured as
//! a `fail` check; no check can abort the report.
//!
//! The overall status starts `healthy` and only moves up in severity:
//!
//! - the API check failing makes it `unhealthy`
//! - any out-of-stock product makes it `warning` (low stock alone does not)
//! - more than `unfulfilled_escalation` unfulfilled orders makes it `warning`
//!
//! The orders check itself warns above the lower `unfulfilled_warning`
//! threshold, so a check can warn while the overall status stays healthy.
//! A failing inventory or orders check does not change the overall status.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use agent_helper_core::{CheckStatus, OverallStatus};

use crate::analytics::InventoryReport;
use crate::shopify::{AdminClient, AdminShopifyError, Entity, EntityKind, ListQuery, ShopInfo};

/// Check names as they appear in the report.
pub const API_CHECK: &str = "api";
pub const INVENTORY_CHECK: &str = "inventory";
pub const ORDERS_CHECK: &str = "orders";

/// Read-only calls the evaluator makes against a store.
pub trait HealthSource {
    /// Lightweight reachability call.
    fn fetch_shop(&self) -> impl Future<Output = Result<ShopInfo, AdminShopifyError>>;

    /// Full inventory rollup.
    fn fetch_inventory(&self) -> impl Future<Output = Result<InventoryReport, AdminShopifyError>>;

    /// The `limit` most recently created orders.
    fn fetch_recent_orders(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Entity>, AdminShopifyError>>;
}

impl HealthSource for AdminClient {
    fn fetch_shop(&self) -> impl Future<Output = Result<ShopInfo, AdminShopifyError>> {
        self.shop_info()
    }

    fn fetch_inventory(&self) -> impl Future<Output = Result<InventoryReport, AdminShopifyError>> {
        self.inventory_report()
    }

    fn fetch_recent_orders(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Entity>, AdminShopifyError>> {
        let query = ListQuery::default()
            .with_page_size(limit)
            .with_max_items(limit as usize);
        self.collect_list(EntityKind::Orders, query)
    }
}

/// Cutoffs used by the orders check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    /// Orders fetched by the orders check.
    pub recent_orders: u32,
    /// The orders check warns above this many unfulfilled orders.
    pub unfulfilled_warning: usize,
    /// The overall status escalates above this many unfulfilled orders.
    pub unfulfilled_escalation: usize,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            recent_orders: 10,
            unfulfilled_warning: 5,
            unfulfilled_escalation: 10,
        }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl HealthCheck {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            details: Map::new(),
        }
    }

    fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<String, HealthCheck>,
    pub status: OverallStatus,
}

impl HealthReport {
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.get(name)
    }
}

/// Run every check and reduce the results to one report.
pub async fn run_health_check<P: HealthSource>(
    store: &P,
    thresholds: &HealthThresholds,
) -> HealthReport {
    let mut overall = OverallStatus::Healthy;
    let mut checks = BTreeMap::new();

    // API reachability
    let api = match store.fetch_shop().await {
        Ok(shop) => HealthCheck::new(API_CHECK, CheckStatus::Pass, format!("Connected to {}", shop.name))
            .with_detail("shop", json!(shop.name)),
        Err(e) => {
            tracing::error!(error = %e, "API check failed");
            overall = overall.escalate(OverallStatus::Unhealthy);
            HealthCheck::new(API_CHECK, CheckStatus::Fail, e.to_string())
        }
    };
    checks.insert(API_CHECK.to_string(), api);

    // Inventory levels
    let inventory = match store.fetch_inventory().await {
        Ok(report) => {
            let low = report.summary.low_stock_products;
            let out = report.summary.out_of_stock_products;
            let status = if low > 0 || out > 0 {
                CheckStatus::Warning
            } else {
                CheckStatus::Pass
            };
            if out > 0 {
                overall = overall.escalate(OverallStatus::Warning);
            }
            HealthCheck::new(
                INVENTORY_CHECK,
                status,
                format!("{low} low stock, {out} out of stock"),
            )
            .with_detail("lowStock", json!(low))
            .with_detail("outOfStock", json!(out))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Inventory check failed");
            HealthCheck::new(INVENTORY_CHECK, CheckStatus::Fail, e.to_string())
        }
    };
    checks.insert(INVENTORY_CHECK.to_string(), inventory);

    // Recent orders
    let orders = match store.fetch_recent_orders(thresholds.recent_orders).await {
        Ok(orders) => {
            let unfulfilled = orders.iter().filter(|o| is_unfulfilled(o)).count();
            let status = if unfulfilled > thresholds.unfulfilled_warning {
                CheckStatus::Warning
            } else {
                CheckStatus::Pass
            };
            if unfulfilled > thresholds.unfulfilled_escalation {
                overall = overall.escalate(OverallStatus::Warning);
            }
            HealthCheck::new(
                ORDERS_CHECK,
                status,
                format!("{unfulfilled} of {} recent orders unfulfilled", orders.len()),
            )
            .with_detail("recentOrders", json!(orders.len()))
            .with_detail("unfulfilled", json!(unfulfilled))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Orders check failed");
            HealthCheck::new(ORDERS_CHECK, CheckStatus::Fail, e.to_string())
        }
    };
    checks.insert(ORDERS_CHECK.to_string(), orders);

    tracing::info!(status = %overall, "Health check complete");

    HealthReport {
        timestamp: Utc::now(),
        checks,
        status: overall,
    }
}

/// `UNFULFILLED` (any case) or no fulfillment status at all.
fn is_unfulfilled(order: &Entity) -> bool {
    let status = order
        .get("displayFulfillmentStatus")
        .or_else(|| order.get("fulfillmentStatus"));
    match status {
        None | Some(Value::Null) => true,
        Some(value) => value
            .as_str()
            .is_some_and(|s| s.eq_ignore_ascii_case("UNFULFILLED")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::future::ready;

    use crate::analytics::compute_inventory_report;

    struct FakeStore {
        shop_up: bool,
        inventory_totals: Option<Vec<i64>>,
        fulfillment: Option<Vec<Option<&'static str>>>,
    }

    impl FakeStore {
        fn healthy() -> Self {
            Self {
                shop_up: true,
                inventory_totals: Some(vec![50, 60]),
                fulfillment: Some(vec![Some("FULFILLED"); 10]),
            }
        }

        fn orders_with_unfulfilled(n: usize) -> Vec<Option<&'static str>> {
            (0..10)
                .map(|i| if i < n { Some("UNFULFILLED") } else { Some("FULFILLED") })
                .collect()
        }
    }

    fn down() -> AdminShopifyError {
        AdminShopifyError::Http {
            status: 503,
            body: "Service Unavailable".to_string(),
        }
    }

    impl HealthSource for FakeStore {
        fn fetch_shop(&self) -> impl Future<Output = Result<ShopInfo, AdminShopifyError>> {
            let result = if self.shop_up {
                Ok(serde_json::from_value(json!({"name": "World Seasonings"})).unwrap())
            } else {
                Err(down())
            };
            ready(result)
        }

        fn fetch_inventory(&self) -> impl Future<Output = Result<InventoryReport, AdminShopifyError>> {
            let result = match &self.inventory_totals {
                Some(totals) => {
                    let products: Vec<Entity> = totals
                        .iter()
                        .map(|t| Entity::from_value(json!({"title": "p", "totalInventory": t})).unwrap())
                        .collect();
                    compute_inventory_report(&products)
                }
                None => Err(down()),
            };
            ready(result)
        }

        fn fetch_recent_orders(
            &self,
            limit: u32,
        ) -> impl Future<Output = Result<Vec<Entity>, AdminShopifyError>> {
            let result = match &self.fulfillment {
                Some(statuses) => Ok(statuses
                    .iter()
                    .take(limit as usize)
                    .map(|s| Entity::from_value(json!({"displayFulfillmentStatus": s})).unwrap())
                    .collect()),
                None => Err(down()),
            };
            ready(result)
        }
    }

    #[tokio::test]
    async fn test_all_checks_pass() {
        let report = run_health_check(&FakeStore::healthy(), &HealthThresholds::default()).await;
        assert_eq!(report.status, OverallStatus::Healthy);
        assert!(report.checks.values().all(|c| c.status == CheckStatus::Pass));
        assert_eq!(report.checks.len(), 3);
    }

    #[tokio::test]
    async fn test_api_failure_forces_unhealthy() {
        let store = FakeStore {
            shop_up: false,
            ..FakeStore::healthy()
        };
        let report = run_health_check(&store, &HealthThresholds::default()).await;

        assert_eq!(report.status, OverallStatus::Unhealthy);
        assert_eq!(report.check(API_CHECK).unwrap().status, CheckStatus::Fail);
        assert_eq!(report.check(INVENTORY_CHECK).unwrap().status, CheckStatus::Pass);
        assert_eq!(report.check(ORDERS_CHECK).unwrap().status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn test_unhealthy_is_not_overwritten_by_later_warning() {
        let store = FakeStore {
            shop_up: false,
            inventory_totals: Some(vec![0]),
            ..FakeStore::healthy()
        };
        let report = run_health_check(&store, &HealthThresholds::default()).await;
        assert_eq!(report.status, OverallStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_seven_unfulfilled_warns_check_but_not_overall() {
        let store = FakeStore {
            fulfillment: Some(FakeStore::orders_with_unfulfilled(7)),
            ..FakeStore::healthy()
        };
        let report = run_health_check(&store, &HealthThresholds::default()).await;

        let orders = report.check(ORDERS_CHECK).unwrap();
        assert_eq!(orders.status, CheckStatus::Warning);
        assert_eq!(orders.details["unfulfilled"], 7);
        assert_eq!(report.status, OverallStatus::Healthy);
    }

    #[tokio::test]
    async fn test_unfulfilled_above_escalation_threshold_warns_overall() {
        let store = FakeStore {
            fulfillment: Some(FakeStore::orders_with_unfulfilled(4)),
            ..FakeStore::healthy()
        };
        let thresholds = HealthThresholds {
            unfulfilled_warning: 2,
            unfulfilled_escalation: 3,
            ..HealthThresholds::default()
        };
        let report = run_health_check(&store, &thresholds).await;
        assert_eq!(report.status, OverallStatus::Warning);
    }

    #[tokio::test]
    async fn test_low_stock_warns_check_only_out_of_stock_escalates() {
        let low_only = FakeStore {
            inventory_totals: Some(vec![3, 50]),
            ..FakeStore::healthy()
        };
        let report = run_health_check(&low_only, &HealthThresholds::default()).await;
        assert_eq!(report.check(INVENTORY_CHECK).unwrap().status, CheckStatus::Warning);
        assert_eq!(report.status, OverallStatus::Healthy);

        let out = FakeStore {
            inventory_totals: Some(vec![0, 50]),
            ..FakeStore::healthy()
        };
        let report = run_health_check(&out, &HealthThresholds::default()).await;
        assert_eq!(report.status, OverallStatus::Warning);
    }

    #[tokio::test]
    async fn test_check_failures_do_not_escalate() {
        let store = FakeStore {
            inventory_totals: None,
            fulfillment: None,
            ..FakeStore::healthy()
        };
        let report = run_health_check(&store, &HealthThresholds::default()).await;
        assert_eq!(report.check(INVENTORY_CHECK).unwrap().status, CheckStatus::Fail);
        assert_eq!(report.check(ORDERS_CHECK).unwrap().status, CheckStatus::Fail);
        assert_eq!(report.status, OverallStatus::Healthy);
    }

    #[test]
    fn test_null_fulfillment_counts_as_unfulfilled() {
        let null = Entity::from_value(json!({"displayFulfillmentStatus": null})).unwrap();
        let legacy = Entity::from_value(json!({"fulfillmentStatus": "unfulfilled"})).unwrap();
        let partial = Entity::from_value(json!({"displayFulfillmentStatus": "PARTIALLY_FULFILLED"})).unwrap();
        assert!(is_unfulfilled(&null));
        assert!(is_unfulfilled(&legacy));
        assert!(!is_unfulfilled(&partial));
    }

    #[test]
    fn test_report_serializes_lowercase_statuses() {
        let mut checks = BTreeMap::new();
        checks.insert(
            API_CHECK.to_string(),
            HealthCheck::new(API_CHECK, CheckStatus::Warning, "slow"),
        );
        let report = HealthReport {
            timestamp: Utc::now(),
            checks,
            status: OverallStatus::Warning,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["checks"]["api"]["status"], "warning");
        assert!(json["checks"]["api"].get("details").is_none());
    }
}
