//! Read side of the travel platform: hotels with their provider codes and
//! rooms, hotel search, and the product catalog.
//!
//! [`InMemoryCatalog`] serves the built-in [`seed`] data; [`PostgresCatalog`]
//! reads the same rows from the tables created by the catalog migration.

pub mod error;
pub mod hotel;
pub mod memory;
pub mod postgres;
pub mod product;
pub mod search;
pub mod seed;
pub mod store;

pub use error::{CatalogError, Result};
pub use hotel::{
    AlternativeHotelsOption, AvailableProperties, Codes, Hotel, HotelRoomFilter,
    HotelSearchRequest, Room,
};
pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use product::{Category, FieldDescription, Product, TypeDescription, schema};
pub use search::{HotelSearchResult, search_hotels};
pub use store::{Catalog, CatalogExt};
