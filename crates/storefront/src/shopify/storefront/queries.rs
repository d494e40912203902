//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`]; its module
//! holds the query text and the variables/response types.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Selection set shared by every operation returning a cart.
macro_rules! cart_fields {
    () => {
        r"
      id
      totalQuantity
      lines(first: 100) {
        edges {
          node {
            id
            quantity
            merchandise {
              ... on ProductVariant {
                id
              }
            }
          }
        }
      }"
    };
}

/// Implements [`GraphQLQuery`] for an operation module.
macro_rules! graphql_operation {
    ($name:ident, $module:ident) => {
        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

/// Cart shape shared by the cart operations.
pub mod cart {
    use super::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: String,
        pub total_quantity: i64,
        pub lines: CartLineConnection,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLineConnection {
        pub edges: Vec<CartLineEdge>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLineEdge {
        pub node: CartLine,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLine {
        pub id: String,
        pub quantity: i64,
        pub merchandise: Merchandise,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Merchandise {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct UserError {
        #[serde(default)]
        pub field: Option<Vec<String>>,
        pub message: String,
    }
}

// =============================================================================
// Products by ID
// =============================================================================

/// Batch lookup of products by global ID via `nodes`.
pub struct GetProductsByIds;

pub mod get_products_by_ids {
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetProductsByIds";
    pub const QUERY: &str = r"query GetProductsByIds($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on Product {
      id
      title
      featuredImage {
        url
      }
      variants(first: 1) {
        edges {
          node {
            id
            price {
              amount
              currencyCode
            }
          }
        }
      }
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub nodes: Vec<Option<Node>>,
    }

    /// A node from `nodes`. Fields are absent when the ID names something
    /// other than a product.
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Node {
        pub id: Option<String>,
        pub title: Option<String>,
        pub featured_image: Option<Image>,
        pub variants: Option<VariantConnection>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Image {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct VariantConnection {
        pub edges: Vec<VariantEdge>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct VariantEdge {
        pub node: Variant,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Variant {
        pub id: String,
        pub price: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyV2 {
        /// Decimal scalar, serialized as a string.
        pub amount: String,
        pub currency_code: String,
    }
}

graphql_operation!(GetProductsByIds, get_products_by_ids);

// =============================================================================
// Cart
// =============================================================================

/// Fetch a cart by ID.
pub struct GetCart;

pub mod get_cart {
    use super::{Deserialize, Serialize, cart};

    pub const OPERATION_NAME: &str = "GetCart";
    pub const QUERY: &str = concat!(
        "query GetCart($cartId: ID!) {\n  cart(id: $cartId) {",
        cart_fields!(),
        "\n  }\n}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<cart::Cart>,
    }
}

graphql_operation!(GetCart, get_cart);

/// Create an empty cart.
pub struct CreateCart;

pub mod create_cart {
    use super::{Deserialize, Serialize, cart};

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = concat!(
        "mutation CreateCart {\n  cartCreate(input: {}) {\n    cart {",
        cart_fields!(),
        "\n    }\n    userErrors {\n      field\n      message\n    }\n  }\n}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub cart: Option<cart::Cart>,
        pub user_errors: Vec<cart::UserError>,
    }
}

graphql_operation!(CreateCart, create_cart);

/// Add lines to an existing cart.
pub struct AddCartLines;

pub mod add_cart_lines {
    use super::{Deserialize, Serialize, cart};

    pub const OPERATION_NAME: &str = "AddCartLines";
    pub const QUERY: &str = concat!(
        "mutation AddCartLines($cartId: ID!, $lines: [CartLineInput!]!) {\n",
        "  cartLinesAdd(cartId: $cartId, lines: $lines) {\n    cart {",
        cart_fields!(),
        "\n    }\n    userErrors {\n      field\n      message\n    }\n  }\n}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineInput {
        pub merchandise_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub cart: Option<cart::Cart>,
        pub user_errors: Vec<cart::UserError>,
    }
}

graphql_operation!(AddCartLines, add_cart_lines);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_queries_share_selection() {
        for query in [get_cart::QUERY, create_cart::QUERY, add_cart_lines::QUERY] {
            assert!(query.contains("totalQuantity"));
            assert!(query.contains("... on ProductVariant"));
        }
    }

    #[test]
    fn test_add_cart_lines_variables() {
        let body = AddCartLines::build_query(add_cart_lines::Variables {
            cart_id: "gid://shopify/Cart/1".to_string(),
            lines: vec![add_cart_lines::CartLineInput {
                merchandise_id: "gid://shopify/ProductVariant/2".to_string(),
                quantity: 1,
            }],
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["operationName"], "AddCartLines");
        assert_eq!(json["variables"]["cartId"], "gid://shopify/Cart/1");
        assert_eq!(
            json["variables"]["lines"][0]["merchandiseId"],
            "gid://shopify/ProductVariant/2"
        );
    }

    #[test]
    fn test_non_product_node_deserializes_empty() {
        let data: get_products_by_ids::ResponseData =
            serde_json::from_value(serde_json::json!({ "nodes": [ {}, null ] })).unwrap();

        assert!(data.nodes[0].as_ref().unwrap().id.is_none());
        assert!(data.nodes[1].is_none());
    }
}
