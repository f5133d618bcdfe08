//! Cursor-based list retrieval.

use futures::{Stream, TryStreamExt};
use serde_json::{Map, Value, json};
use tracing::instrument;

use super::{AdminClient, queries};
use crate::shopify::{AdminShopifyError, Entity, Page, SearchFilter};

/// Largest `first:` the Admin API accepts on a connection.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Requested-cost ceiling the Admin API enforces on a single query.
pub const MAX_QUERY_COST: u32 = 1000;

/// `first:` on nested connections (product variants, order line items).
pub const NESTED_PAGE_SIZE: u32 = 20;

// Outer connection (2) plus its `pageInfo` object (1).
const CONNECTION_OVERHEAD: u32 = 3;

/// Entity lists the fetcher knows how to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Products,
    Orders,
    Customers,
    InventoryItems,
}

impl EntityKind {
    /// Every kind, in CLI display order.
    pub const ALL: [Self; 4] = [
        Self::Products,
        Self::Orders,
        Self::Customers,
        Self::InventoryItems,
    ];

    /// GraphQL document used to fetch one page.
    #[must_use]
    pub const fn document(self) -> &'static str {
        match self {
            Self::Products => queries::PRODUCTS,
            Self::Orders => queries::ORDERS,
            Self::Customers => queries::CUSTOMERS,
            Self::InventoryItems => queries::INVENTORY_ITEMS,
        }
    }

    /// Name of the connection field under `data`.
    #[must_use]
    pub const fn connection(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Customers => "customers",
            Self::InventoryItems => "inventoryItems",
        }
    }

    /// Whether the connection takes a `sortKey` argument.
    #[must_use]
    pub const fn supports_sort_key(self) -> bool {
        !matches!(self, Self::InventoryItems)
    }

    /// Requested cost of one node in [`Self::document`].
    ///
    /// Objects cost 1, scalars 0, and a nested connection costs 2 plus
    /// `first` times its node cost.
    #[must_use]
    pub const fn node_cost(self) -> u32 {
        match self {
            // product + variants connection + variants.pageInfo
            Self::Products => 1 + (2 + NESTED_PAGE_SIZE) + 1,
            // order + totalPriceSet.shopMoney + lineItems connection
            // (lineItem + originalUnitPriceSet.shopMoney) + lineItems.pageInfo
            Self::Orders => 1 + 2 + (2 + NESTED_PAGE_SIZE * 3) + 1,
            // customer + amountSpent
            Self::Customers => 2,
            Self::InventoryItems => 1,
        }
    }

    /// Requested cost of one page of `first` nodes.
    #[must_use]
    pub const fn estimated_cost(self, first: u32) -> u32 {
        CONNECTION_OVERHEAD + first * self.node_cost()
    }

    /// Largest `first:` that keeps one page under [`MAX_QUERY_COST`].
    #[must_use]
    pub const fn max_page_size(self) -> u32 {
        let fit = (MAX_QUERY_COST - CONNECTION_OVERHEAD) / self.node_cost();
        if fit < MAX_PAGE_SIZE { fit } else { MAX_PAGE_SIZE }
    }

    /// Sort key applied when the caller does not pick one.
    #[must_use]
    pub const fn default_sort_key(self) -> Option<&'static str> {
        match self {
            Self::InventoryItems => None,
            Self::Products | Self::Orders | Self::Customers => Some("CREATED_AT"),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.connection())
    }
}

/// Parameters of a list retrieval.
///
/// The default is the first 50-item page onward, newest first, no filter,
/// no item cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Search filter rendered into the `query:` argument.
    pub filter: SearchFilter,
    /// Items requested per call, clamped to `1..=`[`EntityKind::max_page_size`].
    pub page_size: u32,
    /// Stop after this many items. `None` fetches until the last page.
    pub max_items: Option<usize>,
    /// Sort key override. `None` uses [`EntityKind::default_sort_key`].
    pub sort_key: Option<String>,
    /// Reverse the sort order.
    pub reverse: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: SearchFilter::new(),
            page_size: DEFAULT_PAGE_SIZE,
            max_items: None,
            sort_key: None,
            reverse: true,
        }
    }
}

impl ListQuery {
    #[must_use]
    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    #[must_use]
    pub fn with_sort_key(mut self, sort_key: impl Into<String>, reverse: bool) -> Self {
        self.sort_key = Some(sort_key.into());
        self.reverse = reverse;
        self
    }

    fn effective_page_size(&self, kind: EntityKind) -> u32 {
        self.page_size.clamp(1, kind.max_page_size())
    }

    /// `first:` for the next request, given how many items were already
    /// yielded. Returns `None` once `max_items` has been reached.
    fn next_request_size(&self, kind: EntityKind, fetched: usize) -> Option<u32> {
        let page = self.effective_page_size(kind);
        match self.max_items {
            None => Some(page),
            Some(max) => {
                let remaining = max.saturating_sub(fetched);
                if remaining == 0 {
                    None
                } else {
                    Some(u32::try_from(remaining).map_or(page, |r| r.min(page)))
                }
            }
        }
    }

    fn variables(&self, kind: EntityKind, first: u32, after: Option<&str>) -> Value {
        let mut vars = Map::new();
        vars.insert("first".into(), json!(first));
        vars.insert("after".into(), json!(after));
        vars.insert("query".into(), json!(self.filter.render()));
        vars.insert("reverse".into(), json!(self.reverse));
        if kind.supports_sort_key() {
            let sort_key = self.sort_key.as_deref().or_else(|| kind.default_sort_key());
            vars.insert("sortKey".into(), json!(sort_key));
        }
        Value::Object(vars)
    }
}

impl AdminClient {
    /// Lazily page through a connection.
    ///
    /// Each poll that exhausts the buffered page issues one more request
    /// with the previous page's `endCursor`. The stream ends when
    /// `max_items` entities have been yielded or the platform reports no
    /// further page. The first error is yielded and ends the stream.
    /// Entities are yielded in the platform's order.
    pub fn fetch_list(
        &self,
        kind: EntityKind,
        query: ListQuery,
    ) -> impl Stream<Item = Result<Entity, AdminShopifyError>> + Send + 'static {
        let client = self.clone();

        async_stream::try_stream! {
            let mut cursor: Option<String> = None;
            let mut fetched = 0usize;

            while let Some(first) = query.next_request_size(kind, fetched) {
                let variables = query.variables(kind, first, cursor.as_deref());
                let data = client.execute(kind.document(), variables).await?;
                let page = Page::from_data(&data, kind.connection())?;

                tracing::debug!(
                    kind = %kind,
                    requested = first,
                    received = page.nodes.len(),
                    has_next_page = page.has_next_page,
                    "Fetched page"
                );

                let exhausted = !page.has_next_page || page.nodes.is_empty();
                for entity in page.nodes {
                    if query.max_items.is_some_and(|max| fetched >= max) {
                        break;
                    }
                    fetched += 1;
                    yield entity;
                }

                cursor = page.end_cursor;
                if exhausted || cursor.is_none() {
                    break;
                }
            }
        }
    }

    /// Drain [`Self::fetch_list`] into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while fetching; entities fetched
    /// before it are discarded.
    #[instrument(skip(self, query), fields(kind = %kind, max_items = ?query.max_items))]
    pub async fn collect_list(
        &self,
        kind: EntityKind,
        query: ListQuery,
    ) -> Result<Vec<Entity>, AdminShopifyError> {
        let entities: Vec<Entity> = self.fetch_list(kind, query).try_collect().await?;
        tracing::debug!(count = entities.len(), "Collected list");
        Ok(entities)
    }
}
