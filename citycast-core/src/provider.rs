use crate::{
    Config, Coordinates, Forecast, error::FetchError, provider::openweather::OpenWeatherProvider,
    service::ServiceId,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of flat, chronological forecasts for a coordinate pair.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, at: Coordinates) -> Result<Forecast, FetchError>;
}

/// Construct the forecast provider from config.
pub fn forecast_provider_from_config(
    config: &Config,
) -> Result<Box<dyn ForecastProvider>, FetchError> {
    let id = ServiceId::OpenWeather;
    let api_key = config
        .service_api_key(id)
        .ok_or(FetchError::MissingCredentials { service: id })?;

    Ok(Box::new(OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.service_base_url(id),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = forecast_provider_from_config(&cfg).unwrap_err();

        assert!(matches!(
            err,
            FetchError::MissingCredentials {
                service: ServiceId::OpenWeather
            }
        ));
        assert_eq!(err.to_string(), "no API key configured for openweather");
    }

    #[test]
    fn provider_from_config_treats_blank_key_as_missing() {
        let mut cfg = Config::default();
        cfg.upsert_service_api_key(ServiceId::OpenWeather, String::new());

        let err = forecast_provider_from_config(&cfg).unwrap_err();
        assert_eq!(err.service(), ServiceId::OpenWeather);
        assert!(matches!(err, FetchError::MissingCredentials { .. }));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.upsert_service_api_key(ServiceId::OpenWeather, "KEY".to_string());

        assert!(forecast_provider_from_config(&cfg).is_ok());
    }
}
