use crate::domain::money::Rate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a room type in the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomTypeId(pub u64);

impl fmt::Display for RoomTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hotel fields surfaced on reservation detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub name: String,
    pub city: String,
    pub image: String,
}

/// Catalog data consumed from the external room catalog, not owned here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub id: RoomTypeId,
    pub capacity: u32,
    #[serde(rename = "pricePerNight")]
    pub rate: Rate,
    pub total_inventory: u32,
    pub hotel: HotelSummary,
}
