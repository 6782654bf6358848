// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{anyhow, Context, Result};
use encoding_rs::EUC_KR;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tripmate_answer::place::{find_by_name, UNKNOWN_ADDRESS, UNKNOWN_NAME};
use tripmate_answer::{PlaceLookup, PlaceRecord};

use crate::TripmateError;

pub const LATITUDE_COLUMN: &str = "위도";
pub const LONGITUDE_COLUMN: &str = "경도";

/// Name columns seen across the source tables, highest priority first.
pub const NAME_COLUMNS: [&str; 3] = ["관광지명", "관광정보명", "관광지"];

/// Address columns seen across the source tables, highest priority first.
pub const ADDRESS_COLUMNS: [&str; 6] = [
    "정제도로명주소",
    "정제지번주소",
    "소재지도로명주소",
    "소재지지번주소",
    "관광지소재지지번주소",
    "관광지소재지도로명주소",
];

/// All places from every readable source table.
#[derive(Debug, Clone, Default)]
pub struct PlaceCatalog {
    places: Vec<PlaceRecord>,
}

impl PlaceCatalog {
    pub fn from_records(places: Vec<PlaceRecord>) -> Self {
        Self { places }
    }

    /// Loads every file it can. Missing or malformed files are skipped with a
    /// warning; ending up with nothing at all is an error.
    pub fn load(files: &[PathBuf]) -> Result<Self, TripmateError> {
        let mut places = Vec::new();

        for path in files {
            if !path.exists() {
                warn!("Place file not found; skipping — path={}", path.display());
                continue;
            }
            match read_place_file(path) {
                Ok(mut records) => {
                    debug!(
                        "Loaded place file — path={} records={}",
                        path.display(),
                        records.len()
                    );
                    places.append(&mut records);
                }
                Err(e) => warn!("Skipping place file — path={} error={:#}", path.display(), e),
            }
        }

        if places.is_empty() {
            return Err(TripmateError::NoPlaceData);
        }
        info!("Place catalog ready — records={}", places.len());
        Ok(Self { places })
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn places(&self) -> &[PlaceRecord] {
        &self.places
    }

    pub fn find(&self, name: &str) -> Option<&PlaceRecord> {
        find_by_name(&self.places, name)
    }
}

impl PlaceLookup for PlaceCatalog {
    fn find_place(&self, name: &str) -> Option<PlaceRecord> {
        self.find(name).cloned()
    }
}

/// Reads one source table into normalised records.
///
/// The table must have latitude and longitude columns. Name and address come
/// from the first alias column present, or a placeholder when none is.
pub fn read_place_file(path: &Path) -> Result<Vec<PlaceRecord>> {
    let text = read_source_text(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(clean_header)
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let (lat_idx, lon_idx) = match (column(LATITUDE_COLUMN), column(LONGITUDE_COLUMN)) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(anyhow!(
                "missing '{}'/'{}' columns",
                LATITUDE_COLUMN,
                LONGITUDE_COLUMN
            ))
        }
    };
    let name_idx = NAME_COLUMNS.iter().find_map(|&c| column(c));
    let address_idx = ADDRESS_COLUMNS.iter().find_map(|&c| column(c));

    let mut places = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Bad record at row {}", row + 2))?;
        let field = |idx: Option<usize>, fallback: &str| {
            idx.and_then(|i| record.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| fallback.to_string())
        };

        places.push(PlaceRecord {
            name: field(name_idx, UNKNOWN_NAME),
            address: field(address_idx, UNKNOWN_ADDRESS),
            latitude: parse_degrees(record.get(lat_idx)),
            longitude: parse_degrees(record.get(lon_idx)),
        });
    }

    Ok(places)
}

/// Reads a source table as text. The public tourism tables ship as CP949, so
/// anything that is not valid UTF-8 is decoded as CP949 instead.
pub(crate) fn read_source_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            let (text, _, had_errors) = EUC_KR.decode(e.as_bytes());
            if had_errors {
                return Err(anyhow!("{} is neither UTF-8 nor CP949", path.display()));
            }
            debug!("Decoded source table as CP949 — path={}", path.display());
            Ok(text.into_owned())
        }
    }
}

pub(crate) fn clean_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_degrees(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_address_alias_priority() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        fs::write(
            &path,
            " 관광지 ,관광정보명,소재지지번주소,정제지번주소,위도,경도\n\
             낮은우선,수원화성,지번,정제,37.2871,127.0119\n",
        )
        .unwrap();

        let places = read_place_file(&path).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "수원화성");
        assert_eq!(places[0].address, "정제");
        assert_eq!(places[0].latitude, Some(37.2871));
    }

    #[test]
    fn test_placeholders_when_no_alias_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.csv");
        fs::write(&path, "위도,경도,비고\n37.1,127.1,x\n").unwrap();

        let places = read_place_file(&path).unwrap();
        assert_eq!(places[0].name, UNKNOWN_NAME);
        assert_eq!(places[0].address, UNKNOWN_ADDRESS);
    }

    #[test]
    fn test_blank_coordinates_become_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.csv");
        fs::write(&path, "관광지명,위도,경도\n남한산성,,\n용인,abc,127.2\n").unwrap();

        let places = read_place_file(&path).unwrap();
        assert_eq!(places.len(), 2);
        assert!(places.iter().all(|p| p.coordinate().is_none()));
    }

    #[test]
    fn test_cp949_table_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp949.csv");
        let (bytes, _, _) = EUC_KR.encode(
            "관광지명,소재지도로명주소,위도,경도\n수원화성,경기도 수원시,37.28,127.01\n",
        );
        assert!(std::str::from_utf8(&bytes).is_err());
        fs::write(&path, &bytes).unwrap();

        let places = read_place_file(&path).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "수원화성");
        assert_eq!(places[0].address, "경기도 수원시");
        assert_eq!(places[0].longitude, Some(127.01));
    }

    #[test]
    fn test_undecodable_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.csv");
        fs::write(&path, [0xffu8, 0xff, 0xff, b'\n']).unwrap();
        assert!(read_place_file(&path).is_err());
    }

    #[test]
    fn test_file_without_coordinates_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.csv");
        fs::write(&path, "관광지명,주소\n수원화성,수원\n").unwrap();
        assert!(read_place_file(&path).is_err());
    }

    #[test]
    fn test_catalog_skips_bad_files_and_merges_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        let other = dir.path().join("other.csv");
        fs::write(&good, "관광지명,위도,경도\n수원화성,37.28,127.01\n").unwrap();
        fs::write(&bad, "이름만\n있음\n").unwrap();
        fs::write(&other, "관광정보명,위도,경도\n한국민속촌,37.25,127.12\n").unwrap();

        let catalog = PlaceCatalog::load(&[
            good,
            bad,
            dir.path().join("missing.csv"),
            other,
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.find("한국민속촌").is_some());
        assert!(catalog.find_place(" 수원화성 ").is_some());
    }

    #[test]
    fn test_catalog_with_nothing_loaded_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlaceCatalog::load(&[dir.path().join("missing.csv")]);
        assert!(matches!(result, Err(TripmateError::NoPlaceData)));
    }
}
