use placefinder_types::GeoCoordinates;

use crate::map::{CameraTarget, MapScheme};
use crate::search::TextQuery;
use crate::sequence::RequestId;

/// Side effects produced by [`handle_event`](super::handle_event).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Load the map scene. The result must be fed back as
    /// [`Event::SceneLoaded`](super::Event::SceneLoaded).
    LoadScene(MapScheme),
    /// Move the map camera.
    FocusCamera(CameraTarget),
    /// Show the selection marker at the point, replacing the previous one.
    PlaceMarker(GeoCoordinates),
    /// Start a suggestion request.
    RequestSuggestions {
        /// Id the result must be tagged with.
        request: RequestId,
        /// Query to search for.
        query: TextQuery,
    },
    /// Start a nearby places request.
    RequestNearby {
        /// Id the result must be tagged with.
        request: RequestId,
        /// Center of the lookup.
        coordinates: GeoCoordinates,
    },
    /// Remove keyboard focus from the search field.
    ReleaseSearchFocus,
}
