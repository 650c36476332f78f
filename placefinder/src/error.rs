//! Error types used by the crate.

use placefinder_types::error::GeoError;
use thiserror::Error;

/// Placefinder error type.
#[derive(Debug, Error)]
pub enum PlacefinderError {
    /// Engine could not be created, usually because of invalid credentials. Applications are not
    /// expected to recover from this error.
    #[error("initialization failed: {0}")]
    Initialization(String),
    /// Invalid options given to one of the builders.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Invalid coordinates or camera measure.
    #[error("invalid geometry: {0}")]
    Geo(#[from] GeoError),
    /// Map scene could not be loaded.
    #[error("failed to load map scene: {0}")]
    SceneLoad(#[from] SceneLoadError),
    /// Search request failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}

/// Reason the map engine failed to load a scene.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneLoadError {
    /// The engine does not know how to render the requested scheme.
    #[error("map scheme {0} is not supported")]
    UnsupportedScheme(String),
    /// Resources of the scene (styles, tile sources, caches) could not be initialized.
    #[error("failed to initialize scene resources: {0}")]
    Resources(String),
    /// The engine was disposed or has not been created.
    #[error("map engine is not available")]
    EngineUnavailable,
}

/// Reason a search or nearby request did not produce results.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Service could not be reached or the request timed out.
    #[error("network error: {0}")]
    Network(String),
    /// Service rejected the credentials.
    #[error("credentials were rejected by the search service")]
    Authorization,
    /// Request quota is exhausted.
    #[error("search request quota exceeded")]
    Quota,
    /// Service answered with a status the client does not expect.
    #[error("search service returned status {status}: {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Error description returned by the service, if any.
        message: String,
    },
    /// Response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Engine is disposed or was never initialized.
    #[error("search engine is not available")]
    EngineUnavailable,
}

impl From<reqwest::Error> for SearchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::InvalidResponse(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidResponse(value.to_string())
    }
}

impl From<reqwest::Error> for PlacefinderError {
    fn from(value: reqwest::Error) -> Self {
        Self::Search(value.into())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_compact_debug_snapshot;

    use super::*;

    #[test]
    fn json_errors_are_invalid_responses() {
        let error = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let error = SearchError::from(error);

        assert!(matches!(error, SearchError::InvalidResponse(_)));
    }

    #[test]
    fn display_of_nested_errors() {
        let error = PlacefinderError::from(SceneLoadError::UnsupportedScheme("satellite".into()));
        assert_eq!(
            error.to_string(),
            "failed to load map scene: map scheme satellite is not supported"
        );

        let error = PlacefinderError::from(SearchError::Quota);
        assert_compact_debug_snapshot!(error, @"Search(Quota)");
    }
}
