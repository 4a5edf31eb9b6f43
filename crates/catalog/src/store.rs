use async_trait::async_trait;

use crate::error::Result;
use crate::hotel::{Hotel, HotelSearchRequest};
use crate::product::{Category, Product};
use crate::search::{HotelSearchResult, search_hotels};

/// Read-only access to the catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All categories ordered by id.
    async fn categories(&self) -> Result<Vec<Category>>;

    async fn category(&self, id: i32) -> Result<Option<Category>>;

    /// All products ordered by id.
    async fn products(&self) -> Result<Vec<Product>>;

    async fn product(&self, id: i32) -> Result<Option<Product>>;

    /// Products of one category ordered by id. Unknown categories yield an
    /// empty list.
    async fn products_in_category(&self, category_id: i32) -> Result<Vec<Product>>;

    /// All hotels ordered by id.
    async fn hotels(&self) -> Result<Vec<Hotel>>;
}

#[async_trait]
pub trait CatalogExt: Catalog {
    #[tracing::instrument(skip(self, request), fields(requested = request.properties.hotel_ids.len()))]
    async fn search_hotels(&self, request: &HotelSearchRequest) -> Result<HotelSearchResult> {
        let hotels = self.hotels().await?;
        search_hotels(&hotels, request)
    }
}

impl<T: Catalog + ?Sized> CatalogExt for T {}
