//! Fetch-and-aggregate reports.

use chrono::Utc;
use tracing::instrument;

use super::AdminClient;
use super::pagination::{EntityKind, ListQuery, MAX_PAGE_SIZE};
use crate::analytics::{
    InventoryReport, ReportPeriod, SalesAnalytics, compute_inventory_report,
    compute_sales_analytics,
};
use crate::shopify::AdminShopifyError;

impl AdminClient {
    /// Sales rollup over every order created within `period`.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error, or `Data` if an order carries an
    /// unparseable amount.
    #[instrument(skip(self), fields(days = period.days))]
    pub async fn sales_analytics(
        &self,
        period: ReportPeriod,
    ) -> Result<SalesAnalytics, AdminShopifyError> {
        let window = period.window(Utc::now());
        let query = ListQuery::default()
            .with_filter(window.filter())
            .with_page_size(MAX_PAGE_SIZE);

        let orders = self.collect_list(EntityKind::Orders, query).await?;
        tracing::info!(orders = orders.len(), since = %window.start_date, "Computing sales analytics");
        compute_sales_analytics(&orders, window)
    }

    /// Stock buckets and inventory value over every product.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error, or `Data` if a product carries an
    /// unparseable price or quantity.
    #[instrument(skip(self))]
    pub async fn inventory_report(&self) -> Result<InventoryReport, AdminShopifyError> {
        let query = ListQuery::default().with_page_size(MAX_PAGE_SIZE);
        let products = self.collect_list(EntityKind::Products, query).await?;
        tracing::info!(products = products.len(), "Computing inventory report");
        compute_inventory_report(&products)
    }
}
