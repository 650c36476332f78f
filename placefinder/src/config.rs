//! Engine credentials and application options.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use placefinder_types::geo::GeoPoint;
use placefinder_types::{latlon, GeoCoordinates, MapMeasure};
use serde::{Deserialize, Serialize};

use crate::error::PlacefinderError;
use crate::map::{CameraTarget, MapScheme};

/// Name of the variable with the access key id, read at build time and then at run time.
pub const ACCESS_KEY_ID_VAR: &str = "PLACEFINDER_ACCESS_KEY_ID";
/// Name of the variable with the access key secret, read at build time and then at run time.
pub const ACCESS_KEY_SECRET_VAR: &str = "PLACEFINDER_ACCESS_KEY_SECRET";

const DEFAULT_AUTOSUGGEST_URL: &str = "https://autosuggest.search.hereapi.com/v1/autosuggest";
const DEFAULT_REVERSE_GEOCODE_URL: &str = "https://revgeocode.search.hereapi.com/v1/revgeocode";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const INITIAL_LATITUDE: f64 = 52.530932;
const INITIAL_LONGITUDE: f64 = 13.384915;
const INITIAL_DISTANCE_M: f64 = 10_000.0;
const SELECTION_DISTANCE_M: f64 = 1_000.0;
const DEFAULT_SUGGESTION_LIMIT: usize = 5;
const DEFAULT_NEARBY_LIMIT: usize = 10;

/// Credentials and service settings used to create an [`SdkEngine`](crate::SdkEngine).
#[derive(Clone, PartialEq, Eq)]
pub struct SdkOptions {
    access_key_id: String,
    access_key_secret: String,
    autosuggest_url: String,
    reverse_geocode_url: String,
    request_timeout: Duration,
}

impl SdkOptions {
    /// Creates options with the given credentials and default service endpoints.
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            autosuggest_url: DEFAULT_AUTOSUGGEST_URL.to_string(),
            reverse_geocode_url: DEFAULT_REVERSE_GEOCODE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Credentials baked into the binary when it was compiled, if both variables were set.
    pub fn from_build_env() -> Option<Self> {
        match (
            option_env!("PLACEFINDER_ACCESS_KEY_ID"),
            option_env!("PLACEFINDER_ACCESS_KEY_SECRET"),
        ) {
            (Some(id), Some(secret)) => Some(Self::new(id, secret)),
            _ => None,
        }
    }

    /// Credentials from the build environment, or from the process environment if the binary was
    /// built without them.
    pub fn from_env() -> Result<Self, PlacefinderError> {
        if let Some(options) = Self::from_build_env() {
            return Ok(options);
        }

        let read = |name: &str| {
            std::env::var(name).map_err(|_| {
                PlacefinderError::Initialization(format!("environment variable {name} is not set"))
            })
        };

        Ok(Self::new(
            read(ACCESS_KEY_ID_VAR)?,
            read(ACCESS_KEY_SECRET_VAR)?,
        ))
    }

    /// Replaces the autosuggest and reverse geocoding endpoints.
    pub fn with_endpoints(
        mut self,
        autosuggest_url: impl Into<String>,
        reverse_geocode_url: impl Into<String>,
    ) -> Self {
        self.autosuggest_url = autosuggest_url.into();
        self.reverse_geocode_url = reverse_geocode_url.into();
        self
    }

    /// Sets the timeout of a single search request. Defaults to 10 seconds.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Access key id.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub(crate) fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    /// Autosuggest endpoint.
    pub fn autosuggest_url(&self) -> &str {
        &self.autosuggest_url
    }

    /// Reverse geocoding endpoint.
    pub fn reverse_geocode_url(&self) -> &str {
        &self.reverse_geocode_url
    }

    /// Timeout of a single search request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Checks that the credentials look like access keys: non-empty and made of URL-safe
    /// characters only.
    pub(crate) fn validate(&self) -> Result<(), PlacefinderError> {
        validate_key("access key id", &self.access_key_id)?;
        validate_key("access key secret", &self.access_key_secret)?;

        if self.request_timeout.is_zero() {
            return Err(PlacefinderError::Initialization(
                "request timeout must not be zero".into(),
            ));
        }

        for url in [&self.autosuggest_url, &self.reverse_geocode_url] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(PlacefinderError::Initialization(format!(
                    "invalid service url: {url}"
                )));
            }
        }

        Ok(())
    }
}

fn validate_key(name: &str, value: &str) -> Result<(), PlacefinderError> {
    if value.is_empty() {
        return Err(PlacefinderError::Initialization(format!("{name} is empty")));
    }

    let is_allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if !value.chars().all(is_allowed) {
        return Err(PlacefinderError::Initialization(format!(
            "{name} contains invalid characters"
        )));
    }

    Ok(())
}

impl Debug for SdkOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkOptions")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("autosuggest_url", &self.autosuggest_url)
            .field("reverse_geocode_url", &self.reverse_geocode_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Behaviour of the search and selection flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceFinderOptions {
    /// Scene loaded when the map is initialized.
    pub scheme: MapScheme,
    /// Camera position before anything is selected.
    pub initial_camera: CameraTarget,
    /// Camera measure used when focusing on a selected place.
    pub selection_measure: MapMeasure,
    /// Maximum number of autosuggest results.
    pub suggestion_limit: usize,
    /// Maximum number of nearby places.
    pub nearby_limit: usize,
    /// Preferred language of results as a BCP 47 code, e.g. `en-US`.
    pub language: Option<String>,
}

impl Default for PlaceFinderOptions {
    fn default() -> Self {
        Self {
            scheme: MapScheme::NormalDay,
            initial_camera: CameraTarget::new(
                latlon!(INITIAL_LATITUDE, INITIAL_LONGITUDE),
                MapMeasure::distance(INITIAL_DISTANCE_M),
            ),
            selection_measure: MapMeasure::distance(SELECTION_DISTANCE_M),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            nearby_limit: DEFAULT_NEARBY_LIMIT,
            language: None,
        }
    }
}

impl PlaceFinderOptions {
    /// Starts building options from the defaults.
    pub fn builder() -> PlaceFinderOptionsBuilder {
        PlaceFinderOptionsBuilder::default()
    }
}

/// Convenience type to construct [`PlaceFinderOptions`] with validation.
///
/// ```
/// use placefinder::config::PlaceFinderOptions;
/// use placefinder::map::MapScheme;
///
/// let options = PlaceFinderOptions::builder()
///     .with_scheme(MapScheme::NormalNight)
///     .with_initial_latlon(48.8566, 2.3522)
///     .with_suggestion_limit(8)
///     .build()?;
/// # Ok::<(), placefinder::error::PlacefinderError>(())
/// ```
#[derive(Debug, Default)]
pub struct PlaceFinderOptionsBuilder {
    options: PlaceFinderOptions,
}

impl PlaceFinderOptionsBuilder {
    /// Sets the scene scheme. Defaults to [`MapScheme::NormalDay`].
    pub fn with_scheme(mut self, scheme: MapScheme) -> Self {
        self.options.scheme = scheme;
        self
    }

    /// Sets the initial camera position, keeping the initial measure.
    pub fn with_initial_latlon(mut self, lat: f64, lon: f64) -> Self {
        self.options.initial_camera.coordinates = latlon!(lat, lon);
        self
    }

    /// Sets the initial camera target.
    pub fn with_initial_camera(mut self, camera: CameraTarget) -> Self {
        self.options.initial_camera = camera;
        self
    }

    /// Sets the camera measure used for selected places. Defaults to 1000 m.
    pub fn with_selection_measure(mut self, measure: MapMeasure) -> Self {
        self.options.selection_measure = measure;
        self
    }

    /// Sets the maximum number of suggestions. Defaults to 5.
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.options.suggestion_limit = limit;
        self
    }

    /// Sets the maximum number of nearby places. Defaults to 10.
    pub fn with_nearby_limit(mut self, limit: usize) -> Self {
        self.options.nearby_limit = limit;
        self
    }

    /// Sets the preferred result language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.options.language = Some(language.into());
        self
    }

    /// Validates and returns the options.
    pub fn build(self) -> Result<PlaceFinderOptions, PlacefinderError> {
        let options = self.options;
        let camera = options.initial_camera;

        GeoCoordinates::new(camera.coordinates.lat(), camera.coordinates.lon())?;
        camera.measure.validated()?;
        options.selection_measure.validated()?;

        if options.suggestion_limit == 0 || options.nearby_limit == 0 {
            return Err(PlacefinderError::Configuration(
                "result limits must be greater than zero".into(),
            ));
        }

        if options
            .language
            .as_deref()
            .is_some_and(|language| language.trim().is_empty())
        {
            return Err(PlacefinderError::Configuration(
                "language must not be empty".into(),
            ));
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use insta::assert_compact_debug_snapshot;

    use super::*;

    #[test]
    fn defaults_match_initial_view() {
        let options = PlaceFinderOptions::builder().build().unwrap();

        assert_eq!(options.scheme, MapScheme::NormalDay);
        assert_eq!(options.initial_camera.coordinates.lat(), 52.530932);
        assert_eq!(options.initial_camera.coordinates.lon(), 13.384915);
        assert_eq!(options.initial_camera.measure.value(), 10_000.0);
        assert_eq!(options.selection_measure.value(), 1_000.0);
    }

    #[test]
    fn build_rejects_invalid_camera() {
        let result = PlaceFinderOptions::builder()
            .with_initial_latlon(95.0, 0.0)
            .build();
        assert_compact_debug_snapshot!(result, @"Err(Geo(Latitude(95.0)))");

        let result = PlaceFinderOptions::builder()
            .with_selection_measure(MapMeasure::distance(0.0))
            .build();
        assert_compact_debug_snapshot!(result, @"Err(Geo(Measure(0.0)))");
    }

    #[test]
    fn build_rejects_zero_limits() {
        let result = PlaceFinderOptions::builder().with_nearby_limit(0).build();
        assert_matches!(result, Err(PlacefinderError::Configuration(_)));
    }

    #[test]
    fn build_rejects_blank_language() {
        let result = PlaceFinderOptions::builder().with_language(" ").build();
        assert_matches!(result, Err(PlacefinderError::Configuration(_)));
    }

    #[test]
    fn credentials_validation() {
        assert_matches!(SdkOptions::new("key-id_1", "secret.value").validate(), Ok(()));
        assert_matches!(
            SdkOptions::new("", "secret").validate(),
            Err(PlacefinderError::Initialization(_))
        );
        assert_matches!(
            SdkOptions::new("key id", "secret").validate(),
            Err(PlacefinderError::Initialization(_))
        );
        assert_matches!(
            SdkOptions::new("key", "secret")
                .with_request_timeout(Duration::ZERO)
                .validate(),
            Err(PlacefinderError::Initialization(_))
        );
        assert_matches!(
            SdkOptions::new("key", "secret")
                .with_endpoints("ftp://example.com", "https://example.com")
                .validate(),
            Err(PlacefinderError::Initialization(_))
        );
    }

    #[test]
    fn debug_output_hides_secret() {
        let options = SdkOptions::new("key", "very-secret");
        let output = format!("{options:?}");

        assert!(output.contains("key"));
        assert!(!output.contains("very-secret"));
    }
}
