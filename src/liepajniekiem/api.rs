use super::model::EventsByCategory;
use super::parser::extract_events;
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use lazy_static::lazy_static;
use reqwest::Client;
use tracing::{info, warn};

/// The site's day starts 2 hours before midnight UTC
const DAY_START_OFFSET_HOURS: i64 = 2;

lazy_static! {
    static ref REST_CLIENT: Client = Client::new();
}

pub struct LiepajniekiemAPI {
    client: Client,
}

impl Default for LiepajniekiemAPI {
    fn default() -> Self {
        Self::with_client(REST_CLIENT.clone())
    }
}

impl LiepajniekiemAPI {
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /**
    Fetches the calendar page for the given day and groups its events by category.
    The whole page is processed before returning, no partial result is given on failure.
    */
    #[tracing::instrument(skip(self))]
    pub async fn get_events(
        &self,
        site: &str,
        date: NaiveDate,
    ) -> Result<EventsByCategory, ExtractError> {
        if site.is_empty() {
            return Err(ExtractError::InvalidSite);
        }

        let url = build_request_url(site, date);

        info!("Getting events from {}", url);

        let html = self.fetch_page(&url).await?;
        let events = extract_events(&html)?;

        info!(
            "Got {} events in {} categories",
            events.event_count(),
            events.len()
        );

        Ok(events)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ExtractError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .inspect_err(|err| warn!("Request failed: {}", err))?;

        let body = response.bytes().await?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

pub fn normalize_site_url(site: &str) -> String {
    if site.ends_with('/') {
        site.to_string()
    } else {
        format!("{}/", site)
    }
}

/// Seconds since epoch at 22:00 UTC of the day before `date`
pub fn query_timestamp(date: NaiveDate) -> i64 {
    let day_start =
        date.and_time(NaiveTime::MIN).and_utc() - TimeDelta::hours(DAY_START_OFFSET_HOURS);

    day_start.timestamp()
}

pub fn build_request_url(site: &str, date: NaiveDate) -> String {
    format!("{}?{}", normalize_site_url(site), query_timestamp(date))
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    #[error("Failed to query events: {0}")]
    QueryFailure(String),
    #[error("No events table found on the page")]
    EmptyResult,
    #[error("Event row found before any category")]
    MalformedRow,
    #[error("Unexpected node type: {0}")]
    UnexpectedNodeType(String),
    #[error("Site URL must not be empty")]
    InvalidSite,
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::NetworkFailure(err.to_string())
    }
}
