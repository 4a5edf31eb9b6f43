use async_trait::async_trait;
use common::Money;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::Result;
use crate::hotel::Hotel;
use crate::product::{Category, Product};
use crate::store::Catalog;

const PRODUCT_COLUMNS: &str = "SELECT id, name, description, price_cents, category_id FROM products";

/// Catalog backed by the `categories`, `products` and `hotels` tables.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations, which also
    /// seed the catalog tables.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        let catalog = Self::new(pool);
        catalog.run_migrations().await?;
        Ok(catalog)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        Ok(Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            category_id: row.try_get("category_id")?,
        })
    }

    fn row_to_hotel(row: PgRow) -> Result<Hotel> {
        Ok(Hotel {
            hotel_id: row.try_get("hotel_id")?,
            name: row.try_get("name")?,
            city: row.try_get("city")?,
            codes: serde_json::from_value(row.try_get("codes")?)?,
            rooms: serde_json::from_value(row.try_get("rooms")?)?,
        })
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, description FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn category(&self, id: i32) -> Result<Option<Category>> {
        sqlx::query("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_category)
            .transpose()
    }

    async fn products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!("{PRODUCT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn product(&self, id: i32) -> Result<Option<Product>> {
        sqlx::query(&format!("{PRODUCT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_product)
            .transpose()
    }

    async fn products_in_category(&self, category_id: i32) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "{PRODUCT_COLUMNS} WHERE category_id = $1 ORDER BY id"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn hotels(&self) -> Result<Vec<Hotel>> {
        let rows =
            sqlx::query("SELECT hotel_id, name, city, codes, rooms FROM hotels ORDER BY hotel_id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::row_to_hotel).collect()
    }
}
