//! Error types for the Contrail meters.

use thiserror::Error;

/// Result type alias for meter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while polling the analytics and directory services.
#[derive(Error, Debug)]
pub enum Error {
    /// Analytics API answered with anything but 200.
    #[error("OpenContrail API returned {status} {reason}")]
    AnalyticsApi { status: u16, reason: String },

    /// Resource directory (Neutron) answered with a non-success status.
    #[error("Resource directory returned {status} {reason} for {path}")]
    DirectoryApi {
        status: u16,
        reason: String,
        path: String,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A counter field was missing or could not be read as an integer.
    #[error("Cannot extract counter `{field}`: {reason}")]
    Extraction { field: &'static str, reason: String },

    #[error("Invalid resource URL {url}: {reason}")]
    InvalidResourceUrl { url: String, reason: String },

    #[error("No driver registered for scheme `{scheme}`")]
    UnknownDriver { scheme: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// True for failures reported by the analytics service itself.
    pub fn is_analytics_failure(&self) -> bool {
        matches!(self, Error::AnalyticsApi { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_error_message() {
        let err = Error::AnalyticsApi {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "OpenContrail API returned 503 Service Unavailable"
        );
        assert!(err.is_analytics_failure());
    }

    #[test]
    fn test_extraction_error_is_not_api_failure() {
        let err = Error::Extraction {
            field: "in_pkts",
            reason: "field is missing".to_string(),
        };
        assert!(!err.is_analytics_failure());
        assert!(err.to_string().contains("in_pkts"));
    }
}
