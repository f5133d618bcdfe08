//! GraphQL documents for the Shopify Admin API.
//!
//! Documents are sent verbatim through [`super::AdminClient::execute`]; the
//! list queries all share the `$first/$after/$query` variable shape that
//! the paginated fetcher fills in. Nested connections ask for
//! [`super::pagination::NESTED_PAGE_SIZE`] nodes so one page stays under the
//! query cost limit.

// =============================================================================
// Shop
// =============================================================================

pub const SHOP_INFO: &str = r"
query ShopInfo {
  shop {
    name
    url
    email
    plan { displayName }
    currencyCode
    ianaTimezone
  }
}
";

// =============================================================================
// List queries
// =============================================================================

pub const PRODUCTS: &str = r"
query GetProducts($first: Int!, $after: String, $query: String, $sortKey: ProductSortKeys, $reverse: Boolean) {
  products(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) {
    nodes {
      id
      title
      handle
      status
      vendor
      productType
      totalInventory
      createdAt
      updatedAt
      variants(first: 20) {
        nodes {
          id
          title
          sku
          price
          inventoryQuantity
        }
        pageInfo { hasNextPage }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

pub const ORDERS: &str = r"
query GetOrders($first: Int!, $after: String, $query: String, $sortKey: OrderSortKeys, $reverse: Boolean) {
  orders(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) {
    nodes {
      id
      name
      email
      totalPriceSet { shopMoney { amount currencyCode } }
      displayFinancialStatus
      displayFulfillmentStatus
      createdAt
      lineItems(first: 20) {
        nodes {
          title
          quantity
          originalUnitPriceSet { shopMoney { amount currencyCode } }
        }
        pageInfo { hasNextPage }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

pub const CUSTOMERS: &str = r"
query GetCustomers($first: Int!, $after: String, $query: String, $sortKey: CustomerSortKeys, $reverse: Boolean) {
  customers(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) {
    nodes {
      id
      firstName
      lastName
      email
      phone
      numberOfOrders
      amountSpent { amount currencyCode }
      createdAt
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

pub const INVENTORY_ITEMS: &str = r"
query GetInventoryItems($first: Int!, $after: String, $query: String, $reverse: Boolean) {
  inventoryItems(first: $first, after: $after, query: $query, reverse: $reverse) {
    nodes {
      id
      sku
      tracked
      createdAt
      updatedAt
    }
    pageInfo { hasNextPage endCursor }
  }
}
";

// =============================================================================
// Mutations
// =============================================================================

pub const PRODUCT_UPDATE: &str = r"
mutation ProductUpdate($input: ProductInput!) {
  productUpdate(input: $input) {
    product { id title status updatedAt }
    userErrors { field message }
  }
}
";

pub const INVENTORY_ADJUST_QUANTITIES: &str = r"
mutation InventoryAdjustQuantities($input: InventoryAdjustQuantitiesInput!) {
  inventoryAdjustQuantities(input: $input) {
    inventoryAdjustmentGroup {
      reason
      changes { name delta }
    }
    userErrors { field message }
  }
}
";
