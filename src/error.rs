use thiserror::Error;

/// Failure talking to the retrieval endpoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Fetch failed: {0}")]
    Transport(String),

    #[error("Fetch failed: HTTP {status} {reason}")]
    Status { status: u16, reason: String },
}

/// The payload could not be read as delimited text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse failed: payload is not valid UTF-8 ({0})")]
    Encoding(String),

    #[error("Parse failed: missing header row")]
    MissingHeader,

    #[error("Parse failed: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Search term is empty")]
    EmptyQuery,

    #[error("A refresh is already in progress")]
    RefreshInProgress,

    #[error("No data loaded yet")]
    NotLoaded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
