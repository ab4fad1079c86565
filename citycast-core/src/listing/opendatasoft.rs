use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::ListingConfig,
    error::FetchError,
    model::{CityRecord, Coordinates, ListingRequest},
    service::{ServiceId, get_json},
};

use super::{CityDirectory, CityPage};

/// Records search (API v1) over a geonames cities dataset.
#[derive(Debug, Clone)]
pub struct OpenDataSoftDirectory {
    base_url: String,
    dataset: String,
    page_size: u32,
    api_key: Option<String>,
    http: Client,
}

impl OpenDataSoftDirectory {
    pub fn new(listing: &ListingConfig) -> Self {
        Self::with_base_url(ServiceId::OpenDataSoft.default_base_url(), listing, None)
    }

    pub fn with_base_url(base_url: &str, listing: &ListingConfig, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            dataset: listing.dataset.clone(),
            page_size: listing.page_size.max(1),
            api_key,
            http: Client::new(),
        }
    }

    fn query(&self, request: &ListingRequest) -> Vec<(&'static str, String)> {
        let start = u64::from(request.page) * u64::from(self.page_size);
        let mut query = vec![
            ("dataset", self.dataset.clone()),
            ("q", request.query.trim().to_string()),
            ("rows", self.page_size.to_string()),
            ("start", start.to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
struct OdsFields {
    name: Option<String>,
    cou_name_en: Option<String>,
    timezone: Option<String>,
    population: Option<u64>,
    /// geo_point_2d, `[lat, lon]`. Kept raw so one malformed value only
    /// loses that record's coordinates.
    coordinates: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OdsRecord {
    fields: Option<OdsFields>,
}

#[derive(Debug, Deserialize)]
struct OdsSearchResponse {
    #[serde(default)]
    records: Vec<OdsRecord>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn geo_point(value: &serde_json::Value) -> Option<Coordinates> {
    match value.as_array()?.as_slice() {
        [lat, lon] => {
            let (lat, lon) = (lat.as_f64()?, lon.as_f64()?);
            (lat.is_finite() && lon.is_finite()).then(|| Coordinates::new(lat, lon))
        }
        _ => None,
    }
}

impl OdsFields {
    /// A record without a name is unusable; every other field may be absent.
    fn into_city(self) -> Option<CityRecord> {
        let name = non_empty(self.name)?;
        let coordinates = self.coordinates.as_ref().and_then(|raw| {
            let point = geo_point(raw);
            if point.is_none() {
                tracing::debug!(city = %name, %raw, "ignoring malformed coordinates");
            }
            point
        });

        Some(CityRecord {
            name,
            country: non_empty(self.cou_name_en),
            timezone: non_empty(self.timezone),
            population: self.population,
            coordinates,
        })
    }
}

#[async_trait]
impl CityDirectory for OpenDataSoftDirectory {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_page(&self, request: &ListingRequest) -> Result<CityPage, FetchError> {
        let url = format!("{}/api/records/1.0/search/", self.base_url);

        let parsed: OdsSearchResponse =
            get_json(&self.http, ServiceId::OpenDataSoft, &url, &self.query(request)).await?;

        let total = parsed.records.len();
        let cities: Vec<CityRecord> = parsed
            .records
            .into_iter()
            .filter_map(|r| r.fields)
            .filter_map(OdsFields::into_city)
            .collect();

        if cities.len() < total {
            tracing::warn!(dropped = total - cities.len(), "skipping city records without a name");
        }

        Ok(CityPage {
            cities,
            raw_count: total,
        })
    }
}
