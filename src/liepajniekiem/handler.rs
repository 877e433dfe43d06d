use super::api::{ExtractError, LiepajniekiemAPI};
use super::model::EventsByCategory;
use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Coarse error kinds shown to the user
#[derive(strum::IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    General,
    NodesEmpty,
}

impl ExtractError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExtractError::EmptyResult => ErrorCode::NodesEmpty,
            _ => ErrorCode::General,
        }
    }

    /// Free text worth showing next to the error code, if any
    pub fn detail(&self) -> Option<String> {
        match self {
            ExtractError::NetworkFailure(message)
            | ExtractError::QueryFailure(message)
            | ExtractError::UnexpectedNodeType(message) => Some(message.to_string()),
            ExtractError::EmptyResult | ExtractError::MalformedRow | ExtractError::InvalidSite => {
                None
            }
        }
    }
}

/**
Receives the outcome of a load. Both methods consume the handler, so exactly one of them runs.
*/
pub trait ContentHandler: Send + 'static {
    fn on_complete(self, events: EventsByCategory);

    fn on_error(self, code: ErrorCode, message: Option<String>);
}

/// Runs one extraction in the background and reports it to the handler
pub fn spawn_load<H: ContentHandler>(
    api: LiepajniekiemAPI,
    site: String,
    date: NaiveDate,
    handler: H,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match api.get_events(&site, date).await {
            Ok(events) => {
                info!("Loaded {} categories for {}", events.len(), date);
                handler.on_complete(events);
            }
            Err(err) => {
                error!("Failed loading events for {}: {}", date, err);
                handler.on_error(err.code(), err.detail());
            }
        }
    })
}
