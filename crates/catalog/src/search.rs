//! Hotel search over an in-memory hotel list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::hotel::{Hotel, HotelSearchRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchResult {
    /// Requested hotels that have at least one room passing the filter, in
    /// request order. Only matching rooms are listed.
    pub requested: Vec<Hotel>,
    /// Suggested hotels the caller did not ask for, cheapest first.
    pub alternatives: Vec<Hotel>,
}

/// Prices the requested hotels and, if enabled, suggests alternatives.
///
/// Unknown hotel ids are skipped. Alternatives are restricted to the cities of
/// the requested hotels when `same_city_only` is set; with no known requested
/// hotel that yields no alternatives.
pub fn search_hotels(hotels: &[Hotel], request: &HotelSearchRequest) -> Result<HotelSearchResult> {
    let stay = &request.properties;
    if stay.check_out <= stay.check_in {
        return Err(CatalogError::InvalidStay {
            check_in: stay.check_in,
            check_out: stay.check_out,
        });
    }

    let filter = &request.filter;
    let requested_ids: HashSet<&str> = stay.hotel_ids.iter().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let mut cities = HashSet::new();
    let mut requested = Vec::new();
    for id in &stay.hotel_ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let Some(hotel) = hotels.iter().find(|h| h.hotel_id == *id) else {
            tracing::debug!(hotel_id = %id, "requested hotel not in catalog");
            continue;
        };
        cities.insert(hotel.city.as_str());

        let narrowed = hotel.with_matching_rooms(filter);
        if !narrowed.rooms.is_empty() {
            requested.push(narrowed);
        }
    }

    let options = &request.alternatives;
    let mut alternatives = Vec::new();
    if options.enabled && options.max_alternatives > 0 {
        alternatives = hotels
            .iter()
            .filter(|h| !requested_ids.contains(h.hotel_id.as_str()))
            .filter(|h| !options.same_city_only || cities.contains(h.city.as_str()))
            .map(|h| h.with_matching_rooms(filter))
            .filter(|h| !h.rooms.is_empty())
            .collect();

        alternatives.sort_by(|a, b| {
            a.cheapest_room_price()
                .cmp(&b.cheapest_room_price())
                .then_with(|| a.hotel_id.cmp(&b.hotel_id))
        });
        alternatives.truncate(options.max_alternatives);
    }

    Ok(HotelSearchResult {
        requested,
        alternatives,
    })
}
