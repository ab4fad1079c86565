//! Paginated, searchable city collection.
//!
//! Every request gets a [`Ticket`]. Only the response carrying the latest
//! ticket is applied; anything older is discarded, so a slow earlier page can
//! never overwrite the result of a newer search.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, CityRecord, ListingRequest, error::FetchError,
    listing::opendatasoft::OpenDataSoftDirectory, service::ServiceId,
};

pub mod opendatasoft;

/// Remote source of raw city pages.
#[async_trait]
pub trait CityDirectory: Send + Sync + Debug {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<CityPage, FetchError>;
}

/// One fetched page: the usable cities plus how many records the source sent.
///
/// `raw_count` includes records dropped at the boundary, so a page of
/// unusable records still counts as non-empty for paging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CityPage {
    pub cities: Vec<CityRecord>,
    pub raw_count: usize,
}

impl From<Vec<CityRecord>> for CityPage {
    fn from(cities: Vec<CityRecord>) -> Self {
        let raw_count = cities.len();
        Self { cities, raw_count }
    }
}

/// Construct the city directory from config.
pub fn city_directory_from_config(config: &Config) -> Box<dyn CityDirectory> {
    let id = ServiceId::OpenDataSoft;
    Box::new(OpenDataSoftDirectory::with_base_url(
        config.service_base_url(id),
        &config.listing,
        config.service_api_key(id).map(str::to_owned),
    ))
}

/// Identifies one issued listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to a completed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued meanwhile; the response was ignored.
    Stale,
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingView<'a> {
    pub cities: &'a [CityRecord],
    pub has_more: bool,
}

#[derive(Debug)]
pub struct CityListing {
    cities: Vec<CityRecord>,
    has_more: bool,
    failed: bool,
    query: String,
    next_page: u32,
    issued: u64,
    in_flight: Option<(Ticket, ListingRequest)>,
}

impl Default for CityListing {
    fn default() -> Self {
        Self {
            cities: Vec::new(),
            has_more: true,
            failed: false,
            query: String::new(),
            next_page: 0,
            issued: 0,
            in_flight: None,
        }
    }
}

impl CityListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the last applied request failed.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn view(&self) -> ListingView<'_> {
        ListingView {
            cities: &self.cities,
            has_more: self.has_more,
        }
    }

    /// Registers `request` as the newest one. Any response still pending for
    /// an earlier ticket becomes stale.
    pub fn begin(&mut self, request: ListingRequest) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.query = request.query.clone();
        tracing::debug!(?ticket, query = %request.query, page = request.page, "listing request issued");
        self.in_flight = Some((ticket, request));
        ticket
    }

    /// Applies the response for `ticket` if it is still the newest request.
    ///
    /// Errors of the newest request set the failed flag and are returned;
    /// errors of stale requests are dropped.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<CityPage, FetchError>,
    ) -> Result<Completion, FetchError> {
        let request = match self.in_flight.take() {
            Some((current, request)) if current == ticket => request,
            other => {
                self.in_flight = other;
                tracing::debug!(?ticket, "discarding stale listing response");
                return Ok(Completion::Stale);
            }
        };

        let CityPage {
            cities: mut page,
            raw_count,
        } = match result {
            Ok(page) => page,
            Err(err) => {
                self.failed = true;
                return Err(err);
            }
        };
        self.failed = false;
        sort_by_country(&mut page);

        if request.is_search() {
            self.cities = page;
            self.has_more = false;
        } else {
            self.has_more = raw_count > 0;
            if request.page == 0 {
                self.cities = page;
            } else {
                self.cities.extend(page);
            }
            self.next_page = request.page + 1;
        }

        tracing::info!(
            total = self.cities.len(),
            has_more = self.has_more,
            "listing updated"
        );
        Ok(Completion::Applied)
    }

    /// True while browsing (no query), idle, and more pages may exist.
    pub fn should_load_more(&self) -> bool {
        !self.is_loading() && self.query.trim().is_empty() && self.has_more
    }

    /// The next browse page to request, if loading more is currently allowed.
    pub fn next_request(&self) -> Option<ListingRequest> {
        self.should_load_more().then(|| ListingRequest::browse(self.next_page))
    }

    /// Fetches `request` from `directory` and applies it.
    pub async fn search(
        &mut self,
        directory: &dyn CityDirectory,
        request: ListingRequest,
    ) -> Result<ListingView<'_>, FetchError> {
        let ticket = self.begin(request.clone());
        let result = directory.fetch_page(&request).await;
        self.complete(ticket, result)?;
        Ok(self.view())
    }
}

/// Stable sort by country name; a missing country sorts as empty.
fn sort_by_country(page: &mut [CityRecord]) {
    page.sort_by_cached_key(|city| city.country.as_deref().unwrap_or("").to_lowercase());
}
