use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::hotel::Hotel;
use crate::product::{Category, Product};
use crate::seed;
use crate::store::Catalog;

#[derive(Default)]
struct CatalogData {
    categories: Vec<Category>,
    products: Vec<Product>,
    hotels: Vec<Hotel>,
}

/// Catalog held in process memory. Cloning shares the data.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    data: Arc<RwLock<CatalogData>>,
}

impl InMemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog loaded with the built-in seed rows.
    pub fn seeded() -> Self {
        Self {
            data: Arc::new(RwLock::new(CatalogData {
                categories: seed::categories(),
                products: seed::products(),
                hotels: seed::hotels(),
            })),
        }
    }

    /// Inserts or replaces a hotel, keyed by `hotel_id`.
    pub async fn upsert_hotel(&self, hotel: Hotel) {
        let mut data = self.data.write().await;
        match data.hotels.iter_mut().find(|h| h.hotel_id == hotel.hotel_id) {
            Some(existing) => *existing = hotel,
            None => {
                data.hotels.push(hotel);
                data.hotels.sort_by(|a, b| a.hotel_id.cmp(&b.hotel_id));
            }
        }
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.data.read().await.categories.clone())
    }

    async fn category(&self, id: i32) -> Result<Option<Category>> {
        let data = self.data.read().await;
        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        Ok(self.data.read().await.products.clone())
    }

    async fn product(&self, id: i32) -> Result<Option<Product>> {
        let data = self.data.read().await;
        Ok(data.products.iter().find(|p| p.id == id).cloned())
    }

    async fn products_in_category(&self, category_id: i32) -> Result<Vec<Product>> {
        let data = self.data.read().await;
        Ok(data
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn hotels(&self) -> Result<Vec<Hotel>> {
        Ok(self.data.read().await.hotels.clone())
    }
}
