use std::{
    fmt,
    path::PathBuf,
};

use thiserror::Error;

/// The remote services the tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    WaniKani,
    Jpdb,
}

impl Service {
    /// Key used for this service's token in the config file.
    pub fn config_key(&self) -> &'static str {
        match self {
            Service::WaniKani => "wanikani",
            Service::Jpdb => "jpdb",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::WaniKani => write!(f, "WaniKani"),
            Service::Jpdb => write!(f, "jpdb"),
        }
    }
}

/// Coarse error category, used by the presentation layer to decide what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Protocol,
    Network,
    CorpusBuild,
    Internal,
}

#[derive(Error, Debug)]
pub enum WaniWordsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} API key is invalid")]
    Auth { service: Service },

    #[error("{service} API error: {message}")]
    Remote { service: Service, message: String },

    #[error("{service} connection failed: {source}")]
    Network {
        service: Service,
        #[source]
        source: Box<reqwest::Error>,
    },

    #[error("Failed to read corpus source {path:?}: {source}")]
    CorpusSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WaniWordsError: {0}")]
    Custom(String),
}

impl WaniWordsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WaniWordsError::Config(_) => ErrorKind::Configuration,
            WaniWordsError::Auth { .. } => ErrorKind::Authentication,
            WaniWordsError::Remote { .. } => ErrorKind::Protocol,
            WaniWordsError::Network { .. } => ErrorKind::Network,
            WaniWordsError::CorpusSource { .. } => ErrorKind::CorpusBuild,
            WaniWordsError::Io(_) | WaniWordsError::Json(_) | WaniWordsError::Custom(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Transport failures may succeed on a later attempt; nothing else will.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// The service whose credential was rejected, if this is an authentication failure.
    pub fn rejected_credential(&self) -> Option<Service> {
        match self {
            WaniWordsError::Auth { service } => Some(*service),
            _ => None,
        }
    }

    pub fn network(service: Service, error: reqwest::Error) -> Self {
        WaniWordsError::Network { service, source: Box::new(error) }
    }
}

impl From<std::io::Error> for WaniWordsError {
    fn from(error: std::io::Error) -> Self {
        WaniWordsError::Io(Box::new(error))
    }
}
