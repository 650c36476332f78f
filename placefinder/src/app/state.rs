use std::fmt::{Display, Formatter};

use placefinder_types::{GeoCoordinates, MapMeasure};

use crate::config::PlaceFinderOptions;
use crate::error::{SceneLoadError, SearchError};
use crate::map::{CameraTarget, MapScheme};
use crate::search::{Place, TextQuery};
use crate::sequence::{RequestId, RequestSequence};

/// Loading state of the map as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MapStatus {
    /// Scene is being loaded.
    #[default]
    Loading,
    /// Scene is loaded; search is enabled.
    Ready,
    /// Scene could not be loaded. Can be retried.
    Failed(SceneLoadError),
}

/// Message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// The last suggestion request failed.
    SuggestionsFailed(SearchError),
    /// The last nearby places request failed.
    NearbyFailed(SearchError),
}

impl StatusMessage {
    /// The error behind the message.
    pub fn error(&self) -> &SearchError {
        match self {
            StatusMessage::SuggestionsFailed(error) | StatusMessage::NearbyFailed(error) => error,
        }
    }
}

impl Display for StatusMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusMessage::SuggestionsFailed(error) => write!(f, "Search failed: {error}"),
            StatusMessage::NearbyFailed(error) => write!(f, "Nearby lookup failed: {error}"),
        }
    }
}

/// State of the place finder screen.
///
/// Mutated only by [`handle_event`](super::handle_event).
#[derive(Debug, Clone)]
pub struct AppState {
    scheme: MapScheme,
    map_status: MapStatus,
    initial_camera: CameraTarget,
    camera: CameraTarget,
    selection_measure: MapMeasure,

    query: String,
    search_active: bool,
    suggestions: Vec<Place>,
    nearby: Vec<Place>,
    selected: Option<Place>,
    status: Option<StatusMessage>,

    suggestion_requests: RequestSequence,
    nearby_requests: RequestSequence,
}

impl AppState {
    /// Creates the state of a screen that has not started yet.
    pub fn new(options: &PlaceFinderOptions) -> Self {
        Self {
            scheme: options.scheme,
            map_status: MapStatus::Loading,
            initial_camera: options.initial_camera,
            camera: options.initial_camera,
            selection_measure: options.selection_measure,
            query: String::new(),
            search_active: false,
            suggestions: vec![],
            nearby: vec![],
            selected: None,
            status: None,
            suggestion_requests: RequestSequence::new(),
            nearby_requests: RequestSequence::new(),
        }
    }

    /// Scheme of the map scene.
    pub fn scheme(&self) -> MapScheme {
        self.scheme
    }

    /// Loading state of the map.
    pub fn map_status(&self) -> &MapStatus {
        &self.map_status
    }

    /// Search input is accepted only after the map is ready.
    pub fn is_search_enabled(&self) -> bool {
        self.map_status == MapStatus::Ready
    }

    /// Camera target the screen starts with.
    pub fn initial_camera(&self) -> CameraTarget {
        self.initial_camera
    }

    /// Last known camera position.
    pub fn camera(&self) -> CameraTarget {
        self.camera
    }

    /// Text in the search field.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the search bar is expanded.
    pub fn is_search_active(&self) -> bool {
        self.search_active
    }

    /// Last received suggestions, whether they are shown or not.
    pub fn suggestions(&self) -> &[Place] {
        &self.suggestions
    }

    /// Suggestions to show: empty unless the search bar is active and the query has some text.
    pub fn visible_suggestions(&self) -> &[Place] {
        if self.search_active && !self.query.trim().is_empty() {
            &self.suggestions
        } else {
            &[]
        }
    }

    /// Places near the selected place.
    pub fn nearby_places(&self) -> &[Place] {
        &self.nearby
    }

    /// Last selected place.
    pub fn selected_place(&self) -> Option<&Place> {
        self.selected.as_ref()
    }

    /// Status line message.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether a suggestion request is in flight.
    pub fn is_suggestion_pending(&self) -> bool {
        self.suggestion_requests.latest().is_some()
    }

    /// Whether a nearby places request is in flight.
    pub fn is_nearby_pending(&self) -> bool {
        self.nearby_requests.latest().is_some()
    }

    pub(super) fn set_map_status(&mut self, status: MapStatus) {
        self.map_status = status;
    }

    pub(super) fn set_camera_position(&mut self, coordinates: GeoCoordinates) {
        self.camera.coordinates = coordinates;
    }

    pub(super) fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub(super) fn set_search_active(&mut self, active: bool) {
        self.search_active = active;
    }

    pub(super) fn clear_status(&mut self) {
        self.status = None;
    }

    /// Returns the query for a new suggestion request, or `None` after clearing the suggestions if
    /// the query is blank.
    pub(super) fn issue_suggestion_request(&mut self) -> Option<(RequestId, TextQuery)> {
        if self.query.trim().is_empty() {
            self.suggestion_requests.invalidate();
            self.suggestions.clear();
            return None;
        }

        let request = self.suggestion_requests.issue();
        Some((request, TextQuery::new(self.query.clone(), self.camera.coordinates)))
    }

    /// Selects the place and returns the camera target for it, or `None` if the place has no
    /// location.
    pub(super) fn select(&mut self, place: Place) -> Option<(CameraTarget, RequestId)> {
        let coordinates = place.coordinates()?;
        let target = CameraTarget::new(coordinates, self.selection_measure);

        self.camera = target;
        self.selected = Some(place);
        Some((target, self.nearby_requests.issue()))
    }

    pub(super) fn apply_suggestions(
        &mut self,
        request: RequestId,
        result: Result<Vec<Place>, SearchError>,
    ) -> bool {
        if !self.suggestion_requests.is_latest(request) {
            return false;
        }

        self.suggestion_requests.invalidate();
        match result {
            Ok(places) => {
                self.suggestions = places;
                self.status = None;
            }
            Err(error) => self.status = Some(StatusMessage::SuggestionsFailed(error)),
        }

        true
    }

    pub(super) fn apply_nearby(
        &mut self,
        request: RequestId,
        result: Result<Vec<Place>, SearchError>,
    ) -> bool {
        if !self.nearby_requests.is_latest(request) {
            return false;
        }

        self.nearby_requests.invalidate();
        match result {
            Ok(places) => {
                self.nearby = places;
                self.status = None;
            }
            Err(error) => self.status = Some(StatusMessage::NearbyFailed(error)),
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use placefinder_types::latlon;

    use super::*;

    #[test]
    fn suggestions_hidden_when_bar_collapsed_or_query_blank() {
        let mut state = AppState::new(&PlaceFinderOptions::default());
        state.set_query("berlin".into());
        let (request, _) = state.issue_suggestion_request().unwrap();
        state.apply_suggestions(request, Ok(vec![Place::new("Berlin")]));

        assert!(state.visible_suggestions().is_empty());

        state.set_search_active(true);
        assert_eq!(state.visible_suggestions().len(), 1);

        state.set_query("  ".into());
        assert!(state.visible_suggestions().is_empty());
    }

    #[test]
    fn query_is_biased_to_camera() {
        let mut state = AppState::new(&PlaceFinderOptions::default());
        state.set_camera_position(latlon!(48.8566, 2.3522));
        state.set_query("cafe".into());

        let (_, query) = state.issue_suggestion_request().unwrap();
        assert_eq!(query.at, latlon!(48.8566, 2.3522));
    }

    #[test]
    fn status_messages() {
        let message = StatusMessage::NearbyFailed(SearchError::Quota);

        assert_eq!(message.error(), &SearchError::Quota);
        assert_eq!(
            message.to_string(),
            "Nearby lookup failed: search request quota exceeded"
        );
    }
}
