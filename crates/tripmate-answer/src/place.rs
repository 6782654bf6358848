// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

pub const UNKNOWN_NAME: &str = "이름 없음";
pub const UNKNOWN_ADDRESS: &str = "주소 없음";

/// One point of interest, normalised from whichever source table it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PlaceRecord {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinate::new(lat, lon))
            }
            _ => None,
        }
    }
}

/// Resolves a place name mentioned in an answer to a known record.
pub trait PlaceLookup {
    fn find_place(&self, name: &str) -> Option<PlaceRecord>;
}

impl<F> PlaceLookup for F
where
    F: Fn(&str) -> Option<PlaceRecord>,
{
    fn find_place(&self, name: &str) -> Option<PlaceRecord> {
        self(name)
    }
}

/// Exact match on the trimmed name. A record carrying coordinates wins over
/// an earlier one without.
pub fn find_by_name<'a>(places: &'a [PlaceRecord], name: &str) -> Option<&'a PlaceRecord> {
    let name = name.trim();
    let mut by_name = places.iter().filter(|p| p.name.trim() == name);
    let first = by_name.next()?;
    if first.coordinate().is_some() {
        return Some(first);
    }
    Some(by_name.find(|p| p.coordinate().is_some()).unwrap_or(first))
}
