use shared::error::ValidationError;
use thiserror::Error;

/// Failure of a single gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caught before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request could not complete or the server answered non-2xx.
    #[error("{detail}")]
    Transport {
        status: Option<u16>,
        server_message: Option<String>,
        detail: String,
    },
}

impl GatewayError {
    pub fn transport(
        status: Option<u16>,
        server_message: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Transport {
            status,
            server_message,
            detail: detail.into(),
        }
    }

    /// Message supplied by the server in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Transport { server_message, .. } => server_message.as_deref(),
            Self::Validation(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Validation(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|status| status.as_u16()),
            server_message: None,
            detail: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("API url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
