use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::FetchError,
    model::{Coordinates, Forecast, ForecastLocation, Observation},
    service::{ServiceId, get_json},
};

use super::ForecastProvider;

const UNKNOWN_CONDITION: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ServiceId::OpenWeather.default_base_url())
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    pressure: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwVolume {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: Option<String>,
    country: Option<String>,
    /// Shift from UTC in seconds.
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

impl OwForecastEntry {
    /// Validates the entry. A missing condition defaults to "Unknown"; any
    /// other missing reading rejects the entry, naming the field.
    fn into_observation(self, offset: FixedOffset) -> Result<Observation, &'static str> {
        let dt = self.dt.ok_or("dt")?;
        let time = DateTime::from_timestamp(dt, 0).ok_or("dt")?.with_timezone(&offset);

        let main = self.main.ok_or("main")?;
        let wind = self.wind.ok_or("wind")?;

        let condition = self
            .weather
            .into_iter()
            .next()
            .and_then(|w| w.description)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

        Ok(Observation {
            time,
            temperature_c: main.temp.ok_or("main.temp")?,
            temp_min_c: main.temp_min.ok_or("main.temp_min")?,
            temp_max_c: main.temp_max.ok_or("main.temp_max")?,
            condition,
            humidity_pct: main.humidity.ok_or("main.humidity")?,
            wind_speed_mps: wind.speed.ok_or("wind.speed")?,
            pressure_hpa: main.pressure.ok_or("main.pressure")?,
            rain_mm: volume(self.rain),
            snow_mm: volume(self.snow),
        })
    }
}

fn volume(v: Option<OwVolume>) -> Option<f64> {
    v.and_then(|v| v.three_hours).filter(|mm| mm.is_finite() && *mm >= 0.0)
}

fn utc_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| {
        tracing::warn!(seconds, "OpenWeather returned an out-of-range UTC offset, using UTC");
        Utc.fix()
    })
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn forecast(&self, at: Coordinates) -> Result<Forecast, FetchError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);

        let parsed: OwForecastResponse = get_json(
            &self.http,
            ServiceId::OpenWeather,
            &url,
            &[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .await?;

        let (name, country, utc_offset_seconds) = match parsed.city {
            Some(city) => (non_empty(city.name), non_empty(city.country), city.timezone),
            None => (None, None, 0),
        };
        let offset = utc_offset(utc_offset_seconds);

        let total = parsed.list.len();
        let observations: Vec<Observation> = parsed
            .list
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry.into_observation(offset) {
                Ok(obs) => Some(obs),
                Err(field) => {
                    tracing::warn!(index, field, "dropping forecast entry with missing field");
                    None
                }
            })
            .collect();

        tracing::debug!(total, kept = observations.len(), "OpenWeather forecast received");

        Ok(Forecast {
            location: ForecastLocation {
                name,
                country,
                coordinates: at,
                utc_offset_seconds: offset.local_minus_utc(),
            },
            observations,
        })
    }
}
