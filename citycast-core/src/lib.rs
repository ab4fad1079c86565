//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The city directory listing (paginated, searchable, stale-response safe)
//! - The forecast provider abstraction
//! - Forecast aggregation into per-day summaries
//!
//! It is used by `citycast-cli`, but can also be reused by other front-ends.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod listing;
pub mod model;
pub mod provider;
pub mod service;

pub use aggregate::aggregate;
pub use config::{Config, ListingConfig, ServiceConfig};
pub use error::FetchError;
pub use listing::{CityDirectory, CityListing, CityPage, Completion, ListingView, Ticket};
pub use model::{
    CityRecord, Coordinates, DaySummary, DetailRow, Forecast, ForecastLocation, ListingRequest,
    Observation,
};
pub use provider::ForecastProvider;
pub use service::ServiceId;
