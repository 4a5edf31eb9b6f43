//! Hotel data-transfer objects and search payloads.
//!
//! Field names are camelCase on the wire.

use chrono::NaiveDate;
use common::Money;
use serde::{Deserialize, Serialize};

/// A hotel's identifiers at one distribution provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Codes {
    pub hotel_id: String,
    pub provider: String,
    pub provider_code: String,
    pub chain_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: String,
    pub name: String,
    /// Maximum number of guests.
    pub capacity: u32,
    /// Board basis, e.g. `RO` (room only), `BB` (bed and breakfast), `HB`.
    pub board: String,
    pub price_per_night: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub hotel_id: String,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub codes: Vec<Codes>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Hotel {
    /// Cheapest nightly price among `rooms`, if any.
    pub fn cheapest_room_price(&self) -> Option<Money> {
        self.rooms.iter().map(|r| r.price_per_night).min()
    }

    /// Copy of this hotel keeping only the rooms accepted by `filter`.
    pub fn with_matching_rooms(&self, filter: &HotelRoomFilter) -> Hotel {
        Hotel {
            rooms: self
                .rooms
                .iter()
                .filter(|room| filter.matches(room))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

/// Room constraints applied during a search. Unset fields accept any room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoomFilter {
    #[serde(default)]
    pub min_capacity: Option<u32>,
    #[serde(default)]
    pub max_price_per_night: Option<Money>,
    /// Accepted board codes, compared case-insensitively. Empty accepts all.
    #[serde(default)]
    pub boards: Vec<String>,
}

impl HotelRoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        if let Some(min) = self.min_capacity
            && room.capacity < min
        {
            return false;
        }
        if let Some(max) = self.max_price_per_night
            && room.price_per_night > max
        {
            return false;
        }
        self.boards.is_empty()
            || self
                .boards
                .iter()
                .any(|b| b.trim().eq_ignore_ascii_case(&room.board))
    }
}

/// The hotels a caller wants priced for a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableProperties {
    pub hotel_ids: Vec<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl AvailableProperties {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Whether and how to suggest hotels the caller did not ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlternativeHotelsOption {
    pub enabled: bool,
    pub max_alternatives: usize,
    pub same_city_only: bool,
}

impl Default for AlternativeHotelsOption {
    fn default() -> Self {
        Self {
            enabled: false,
            max_alternatives: 3,
            same_city_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchRequest {
    pub properties: AvailableProperties,
    #[serde(default)]
    pub filter: HotelRoomFilter,
    #[serde(default)]
    pub alternatives: AlternativeHotelsOption,
}
