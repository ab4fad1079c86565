use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// OpenStreetMap link centred on these coordinates with a marker.
    pub fn map_url(&self, zoom: u8) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={zoom}/{lat}/{lon}",
            lat = self.latitude,
            lon = self.longitude,
        )
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One 3-hour forecast reading, already validated at the fetch boundary.
///
/// `time` carries the location's UTC offset, so its calendar date and
/// time-of-day are the location's local ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: DateTime<FixedOffset>,
    pub temperature_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
    pub rain_mm: Option<f64>,
    pub snow_mm: Option<f64>,
}

impl Observation {
    pub fn local_date(&self) -> NaiveDate {
        self.time.date_naive()
    }

    /// Rain plus snow volume; an absent kind counts as zero.
    pub fn precipitation_mm(&self) -> f64 {
        self.rain_mm.unwrap_or(0.0) + self.snow_mm.unwrap_or(0.0)
    }
}

/// Location metadata returned alongside a forecast. Passed to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLocation {
    pub name: Option<String>,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub utc_offset_seconds: i32,
}

/// A fetched forecast: flat chronological observations plus location metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: ForecastLocation,
    pub observations: Vec<Observation>,
}

impl Forecast {
    /// Per-day summaries of this forecast, recomputed on every call.
    pub fn daily(&self) -> Vec<DaySummary> {
        aggregate::aggregate(&self.observations)
    }
}

/// Display row kept for every observation of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    /// Local time of day, `HH:MM`.
    pub time: String,
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
    /// Occurrences per condition label, in first-seen order.
    pub condition_counts: IndexMap<String, u32>,
    pub dominant_condition: String,
    pub rain_mm: f64,
    pub snow_mm: f64,
    pub precipitation_total_mm: f64,
    pub has_precipitation: bool,
    pub details: Vec<DetailRow>,
}

/// A city from the remote directory. Fields the source left out stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub population: Option<u64>,
    pub coordinates: Option<Coordinates>,
}

/// A listing request: free-text query plus zero-based page offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingRequest {
    pub query: String,
    pub page: u32,
}

impl ListingRequest {
    /// Unfiltered browsing of the given page.
    pub fn browse(page: u32) -> Self {
        Self { query: String::new(), page }
    }

    /// A search always starts from the first page.
    pub fn search(query: impl Into<String>) -> Self {
        Self { query: query.into(), page: 0 }
    }

    pub fn is_search(&self) -> bool {
        !self.query.trim().is_empty()
    }
}
