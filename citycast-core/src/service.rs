use reqwest::Client;
use serde::de::DeserializeOwned;
use std::convert::TryFrom;

use crate::error::FetchError;

/// Remote services the core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    /// OpenWeatherMap 5 day / 3 hour forecast.
    OpenWeather,
    /// OpenDataSoft city directory.
    OpenDataSoft,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "openweather",
            ServiceId::OpenDataSoft => "opendatasoft",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::OpenWeather, ServiceId::OpenDataSoft]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "https://api.openweathermap.org",
            ServiceId::OpenDataSoft => "https://public.opendatasoft.com",
        }
    }

    /// Whether requests are refused without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ServiceId::OpenWeather)
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ServiceId::OpenWeather),
            "opendatasoft" => Ok(ServiceId::OpenDataSoft),
            _ => Err(anyhow::anyhow!(
                "Unknown service '{value}'. Supported services: openweather, opendatasoft."
            )),
        }
    }
}

/// GET `url` and decode a JSON body, mapping each failure to its `FetchError` kind.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    service: ServiceId,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, FetchError> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FetchError::Transport { service, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { service, source })?;

    if !status.is_success() {
        return Err(FetchError::Status {
            service,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| FetchError::Decode { service, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_id_as_str_roundtrip() {
        for id in ServiceId::all() {
            let parsed = ServiceId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn service_id_parse_is_case_insensitive() {
        let parsed = ServiceId::try_from("OpenWeather").expect("mixed case should parse");
        assert_eq!(parsed, ServiceId::OpenWeather);
    }

    #[test]
    fn unknown_service_error() {
        let err = ServiceId::try_from("weatherapi").unwrap_err();
        assert!(err.to_string().contains("Unknown service"));
    }

    #[test]
    fn only_openweather_requires_key() {
        assert!(ServiceId::OpenWeather.requires_api_key());
        assert!(!ServiceId::OpenDataSoft.requires_api_key());
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
