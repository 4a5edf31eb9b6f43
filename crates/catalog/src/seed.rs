//! Built-in catalog rows. `migrations/002_create_catalog_tables.sql` inserts the
//! same data, so both catalog backends answer identically out of the box.

use common::Money;

use crate::hotel::{Codes, Hotel, Room};
use crate::product::{Category, Product};

pub fn categories() -> Vec<Category> {
    [
        (1, "Luggage", "Suitcases and bags for every trip length"),
        (2, "Insurance", "Travel cover for trips and yearly plans"),
        (3, "Accessories", "Small items that make travelling easier"),
    ]
    .into_iter()
    .map(|(id, name, description)| Category {
        id,
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn products() -> Vec<Product> {
    [
        (1, "Carry-on Spinner", "55cm four-wheel cabin case", 14_999, 1),
        (2, "Checked Hardside 75", "75cm polycarbonate checked case", 22_999, 1),
        (3, "Single Trip Cover", "Medical and cancellation cover for one trip", 4_900, 2),
        (4, "Annual Multi-Trip Cover", "Unlimited trips of up to 31 days", 18_900, 2),
        (5, "Universal Travel Adapter", "Plug adapter for 150 countries", 2_499, 3),
        (6, "Memory Foam Neck Pillow", "Washable cover, packs flat", 1_999, 3),
    ]
    .into_iter()
    .map(|(id, name, description, cents, category_id)| Product {
        id,
        name: name.to_string(),
        description: description.to_string(),
        price: Money::from_cents(cents),
        category_id,
    })
    .collect()
}

fn code(hotel_id: &str, provider: &str, provider_code: &str, chain_code: &str) -> Codes {
    Codes {
        hotel_id: hotel_id.to_string(),
        provider: provider.to_string(),
        provider_code: provider_code.to_string(),
        chain_code: chain_code.to_string(),
    }
}

fn room(room_id: &str, name: &str, capacity: u32, board: &str, cents: i64) -> Room {
    Room {
        room_id: room_id.to_string(),
        name: name.to_string(),
        capacity,
        board: board.to_string(),
        price_per_night: Money::from_cents(cents),
    }
}

fn hotel(hotel_id: &str, name: &str, city: &str, codes: Vec<Codes>, rooms: Vec<Room>) -> Hotel {
    Hotel {
        hotel_id: hotel_id.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        codes,
        rooms,
    }
}

pub fn hotels() -> Vec<Hotel> {
    vec![
        hotel(
            "HTL-BCN-001",
            "Hotel Arts Barcelona",
            "Barcelona",
            vec![
                code("HTL-BCN-001", "hotelbeds", "6533", "RC"),
                code("HTL-BCN-001", "expedia", "EXP-21544", "RC"),
            ],
            vec![
                room("DBL-STD", "Standard Double", 2, "RO", 18_900),
                room("JST", "Junior Suite", 3, "BB", 34_900),
            ],
        ),
        hotel(
            "HTL-BCN-002",
            "Casa Camper",
            "Barcelona",
            vec![code("HTL-BCN-002", "hotelbeds", "87120", "CC")],
            vec![room("DBL", "Double Room", 2, "BB", 15_900)],
        ),
        hotel(
            "HTL-BCN-003",
            "Hostal Grau",
            "Barcelona",
            vec![code("HTL-BCN-003", "hotelbeds", "91002", "IND")],
            vec![
                room("TWN", "Twin Room", 2, "RO", 8_900),
                room("SGL", "Single Room", 1, "RO", 6_500),
            ],
        ),
        hotel(
            "HTL-LIS-001",
            "Memmo Alfama",
            "Lisbon",
            vec![code("HTL-LIS-001", "hotelbeds", "154870", "MM")],
            vec![room("DBL", "Double Room", 2, "BB", 14_500)],
        ),
        hotel(
            "HTL-LIS-002",
            "Lisboa Pessoa",
            "Lisbon",
            vec![code("HTL-LIS-002", "expedia", "EXP-77310", "IND")],
            vec![room("FAM", "Family Room", 4, "HB", 21_000)],
        ),
    ]
}
