use serde::Serialize;

/// A rentable place listed by a user in a city.
///
/// The `*_id` fields hold plain identifiers of other records. Nothing checks
/// that the referenced records exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Place {
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub number_rooms: i64,
    pub number_bathrooms: i64,
    pub max_guest: i64,
    pub price_by_night: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Ids of [`Amenity`](super::Amenity) records.
    pub amenity_ids: Vec<String>,
}
