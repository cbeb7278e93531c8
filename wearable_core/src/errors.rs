use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Broker error: {0}")]
    Broker(#[source] BoxError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed entry in flat record: {0:?}")]
    MalformedEntry(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value {value:?} for field {field}")]
    InvalidField { field: String, value: String },

    #[error("Record for topic {found} received on queue {expected}")]
    UnexpectedTopic { expected: String, found: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown queue: {0}")]
    UnknownQueue(String),

    #[error("Prefetch limit reached, acknowledge the in-flight delivery first")]
    PrefetchExceeded,

    #[error("Delivery handle does not belong to this subscription")]
    UnknownDelivery,

    #[error("Queue closed")]
    Closed,
}

impl Error {
    pub fn broker<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Broker(Box::new(err))
    }

    pub(crate) fn invalid(field: &str, value: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Connection-level failures are fatal to the process; everything else is a
    /// problem with a single record.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Broker(_) | Error::Closed)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
