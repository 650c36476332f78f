use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::SdkOptions;
use crate::error::PlacefinderError;
use crate::search::HereSearchEngine;

const USER_AGENT: &str = concat!("placefinder/", env!("CARGO_PKG_VERSION"));

/// Authenticated connection to the search service.
///
/// One engine is created at startup. Search engines created from it share its HTTP client and stop
/// working after [`SdkEngine::dispose`] is called.
#[derive(Debug)]
pub struct SdkEngine {
    options: Arc<SdkOptions>,
    http_client: reqwest::Client,
    disposed: Arc<AtomicBool>,
}

impl SdkEngine {
    /// Validates the credentials and creates the engine.
    ///
    /// Fails with [`PlacefinderError::Initialization`] if the credentials are malformed or the
    /// HTTP client cannot be created. The credentials are not checked against the service here; a
    /// rejected key is reported by the first search request.
    pub fn new(options: SdkOptions) -> Result<Self, PlacefinderError> {
        options.validate()?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.request_timeout())
            .build()
            .map_err(|err| {
                PlacefinderError::Initialization(format!("failed to create HTTP client: {err}"))
            })?;

        log::info!(
            "Search engine initialized for access key {}",
            options.access_key_id()
        );

        Ok(Self {
            options: Arc::new(options),
            http_client,
            disposed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Options the engine was created with.
    pub fn options(&self) -> &SdkOptions {
        &self.options
    }

    /// Creates a search engine that uses this engine's connection.
    pub fn search_engine(&self) -> HereSearchEngine {
        HereSearchEngine::new(
            self.http_client.clone(),
            self.options.clone(),
            self.disposed.clone(),
        )
    }

    /// Returns true after [`SdkEngine::dispose`] was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Releases the engine. Requests started after this fail with
    /// [`SearchError::EngineUnavailable`](crate::error::SearchError::EngineUnavailable).
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            log::info!("Search engine disposed");
        }
    }
}

impl Drop for SdkEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use placefinder_types::latlon;

    use super::*;
    use crate::error::SearchError;
    use crate::search::{SearchEngine, SearchOptions};

    #[test]
    fn invalid_credentials_fail_initialization() {
        let result = SdkEngine::new(SdkOptions::new("", "secret"));
        assert_matches!(result, Err(PlacefinderError::Initialization(_)));
    }

    #[test]
    fn valid_credentials() {
        let engine = SdkEngine::new(SdkOptions::new("key-id", "secret")).unwrap();

        assert!(!engine.is_disposed());
        assert_eq!(engine.options().access_key_id(), "key-id");
    }

    #[test]
    fn search_fails_after_dispose() {
        let engine = SdkEngine::new(SdkOptions::new("key-id", "secret")).unwrap();
        let search = engine.search_engine();

        engine.dispose();
        engine.dispose();

        let options = SearchOptions::with_max_items(5);
        let result = tokio_test::block_on(search.nearby(latlon!(52.5, 13.4), &options));
        assert_eq!(result, Err(SearchError::EngineUnavailable));
    }

    #[test]
    fn dropping_engine_disposes_search_engines() {
        let engine = SdkEngine::new(SdkOptions::new("key-id", "secret")).unwrap();
        let search = engine.search_engine();
        drop(engine);

        let options = SearchOptions::with_max_items(5);
        let result = tokio_test::block_on(search.nearby(latlon!(52.5, 13.4), &options));
        assert_eq!(result, Err(SearchError::EngineUnavailable));
    }
}
