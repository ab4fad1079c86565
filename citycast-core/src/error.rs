use crate::service::ServiceId;

/// Failure of a single remote fetch. Terminal for that request; nothing retries.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to send request to {service}: {source}")]
    Transport {
        service: ServiceId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: ServiceId,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse {service} response: {source}")]
    Decode {
        service: ServiceId,
        #[source]
        source: serde_json::Error,
    },

    #[error("no API key configured for {service}")]
    MissingCredentials { service: ServiceId },
}

impl FetchError {
    pub fn service(&self) -> ServiceId {
        match self {
            FetchError::Transport { service, .. }
            | FetchError::Status { service, .. }
            | FetchError::Decode { service, .. }
            | FetchError::MissingCredentials { service } => *service,
        }
    }
}
