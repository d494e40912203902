//! GraphQL query definitions for Shopify Admin API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with
//! hand-written variables and response types.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog page
// =============================================================================

/// One page of the product catalog with the first variant's price.
pub struct GetCatalogPage;

pub mod get_catalog_page {
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetCatalogPage";
    pub const QUERY: &str = r"query GetCatalogPage($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges {
      cursor
      node {
        id
        title
        featuredImage {
          url
        }
        variants(first: 1) {
          edges {
            node {
              price
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
    }
  }
}
";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
        pub after: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: ProductConnection,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductConnection {
        pub edges: Vec<ProductEdge>,
        pub page_info: PageInfo,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductEdge {
        pub cursor: String,
        pub node: Product,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Product {
        pub id: String,
        pub title: String,
        pub featured_image: Option<Image>,
        pub variants: VariantConnection,
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
        /// Money scalar, serialized as a decimal string.
        pub price: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageInfo {
        pub has_next_page: bool,
    }
}

impl GraphQLQuery for GetCatalogPage {
    type Variables = get_catalog_page::Variables;
    type ResponseData = get_catalog_page::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_catalog_page::QUERY,
            operation_name: get_catalog_page::OPERATION_NAME,
        }
    }
}
