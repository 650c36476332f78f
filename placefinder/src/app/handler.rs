use placefinder_types::GeoCoordinates;

use super::{Action, AppState, MapStatus};
use crate::error::{SceneLoadError, SearchError};
use crate::search::Place;
use crate::sequence::RequestId;

/// Events from the UI, the map and the search engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The screen is shown for the first time.
    Start,
    /// Result of an [`Action::LoadScene`].
    SceneLoaded(Result<(), SceneLoadError>),
    /// User asked to load the scene again after a failure.
    RetrySceneLoad,
    /// Text of the search field changed.
    QueryChanged(String),
    /// User submitted the search field.
    SearchSubmitted,
    /// The search bar was expanded or collapsed.
    SearchActiveChanged(bool),
    /// Back button of the search bar.
    BackPressed,
    /// Clear button of the search bar.
    ClearPressed,
    /// User picked an item of the suggestion list.
    SuggestionSelected(Place),
    /// User picked an item of the nearby places list.
    NearbyPlaceSelected(Place),
    /// Result of an [`Action::RequestSuggestions`].
    SuggestionsReceived {
        /// Id of the request.
        request: RequestId,
        /// Places or the reason there are none.
        result: Result<Vec<Place>, SearchError>,
    },
    /// Result of an [`Action::RequestNearby`].
    NearbyReceived {
        /// Id of the request.
        request: RequestId,
        /// Places or the reason there are none.
        result: Result<Vec<Place>, SearchError>,
    },
    /// User moved the map.
    CameraMoved(GeoCoordinates),
    /// User closed the status message.
    DismissStatus,
}

/// Applies the event to the state and returns the side effects to execute, in order.
pub fn handle_event(state: &mut AppState, event: Event) -> Vec<Action> {
    match event {
        Event::Start => match state.map_status() {
            MapStatus::Ready => vec![],
            _ => {
                state.set_map_status(MapStatus::Loading);
                vec![
                    Action::FocusCamera(state.initial_camera()),
                    Action::LoadScene(state.scheme()),
                ]
            }
        },
        Event::SceneLoaded(Ok(())) => {
            state.set_map_status(MapStatus::Ready);
            vec![]
        }
        Event::SceneLoaded(Err(error)) => {
            state.set_map_status(MapStatus::Failed(error));
            vec![]
        }
        Event::RetrySceneLoad => match state.map_status() {
            MapStatus::Failed(_) => {
                state.set_map_status(MapStatus::Loading);
                vec![Action::LoadScene(state.scheme())]
            }
            _ => vec![],
        },
        Event::QueryChanged(query) => {
            if !state.is_search_enabled() {
                return vec![];
            }

            state.set_query(query);
            state.set_search_active(true);
            request_suggestions(state)
        }
        Event::SearchSubmitted => {
            if !state.is_search_enabled() {
                return vec![];
            }

            request_suggestions(state)
        }
        Event::SearchActiveChanged(active) => {
            if state.is_search_enabled() {
                state.set_search_active(active);
            }
            vec![]
        }
        Event::BackPressed => {
            state.set_search_active(false);
            vec![Action::ReleaseSearchFocus]
        }
        Event::ClearPressed => {
            state.set_query(String::new());
            request_suggestions(state)
        }
        Event::SuggestionSelected(place) => {
            state.set_query(place.title().to_string());
            state.set_search_active(false);

            let mut actions = vec![Action::ReleaseSearchFocus];
            actions.extend(select_place(state, place));
            actions
        }
        Event::NearbyPlaceSelected(place) => select_place(state, place),
        Event::SuggestionsReceived { request, result } => {
            if let Err(error) = &result {
                log::warn!("Suggestion request {request} failed: {error}");
            }

            if !state.apply_suggestions(request, result) {
                log::debug!("Dropping stale suggestions {request}");
            }
            vec![]
        }
        Event::NearbyReceived { request, result } => {
            if let Err(error) = &result {
                log::warn!("Nearby places request {request} failed: {error}");
            }

            if !state.apply_nearby(request, result) {
                log::debug!("Dropping stale nearby places {request}");
            }
            vec![]
        }
        Event::CameraMoved(coordinates) => {
            state.set_camera_position(coordinates);
            vec![]
        }
        Event::DismissStatus => {
            state.clear_status();
            vec![]
        }
    }
}

fn request_suggestions(state: &mut AppState) -> Vec<Action> {
    match state.issue_suggestion_request() {
        Some((request, query)) => vec![Action::RequestSuggestions { request, query }],
        None => vec![],
    }
}

fn select_place(state: &mut AppState, place: Place) -> Vec<Action> {
    let title = place.title().to_string();
    let Some((target, request)) = state.select(place) else {
        log::debug!("Place '{title}' has no location, ignoring");
        return vec![];
    };

    log::debug!("Selected '{title}' at {}", target.coordinates);

    vec![
        Action::FocusCamera(target),
        Action::PlaceMarker(target.coordinates),
        Action::RequestNearby {
            request,
            coordinates: target.coordinates,
        },
    ]
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use placefinder_types::{latlon, MapMeasure};

    use super::*;
    use crate::app::StatusMessage;
    use crate::config::PlaceFinderOptions;
    use crate::map::{CameraTarget, MapScheme};
    use crate::search::Address;

    fn ready_state() -> AppState {
        let mut state = AppState::new(&PlaceFinderOptions::default());
        handle_event(&mut state, Event::Start);
        handle_event(&mut state, Event::SceneLoaded(Ok(())));
        state
    }

    fn place(title: &str, lat: f64, lon: f64) -> Place {
        Place::new(title).with_coordinates(latlon!(lat, lon))
    }

    fn suggestion_request(actions: &[Action]) -> RequestId {
        match actions {
            [Action::RequestSuggestions { request, .. }] => *request,
            other => panic!("expected a suggestion request, got {other:?}"),
        }
    }

    fn nearby_request(actions: &[Action]) -> RequestId {
        actions
            .iter()
            .find_map(|action| match action {
                Action::RequestNearby { request, .. } => Some(*request),
                _ => None,
            })
            .expect("nearby request")
    }

    #[test]
    fn start_focuses_initial_camera_and_loads_scene() {
        let mut state = AppState::new(&PlaceFinderOptions::default());
        let actions = handle_event(&mut state, Event::Start);

        assert_eq!(
            actions,
            vec![
                Action::FocusCamera(CameraTarget::new(
                    latlon!(52.530932, 13.384915),
                    MapMeasure::distance(10_000.0)
                )),
                Action::LoadScene(MapScheme::NormalDay),
            ]
        );
        assert!(!state.is_search_enabled());

        handle_event(&mut state, Event::SceneLoaded(Ok(())));
        assert!(state.is_search_enabled());
        assert!(handle_event(&mut state, Event::Start).is_empty());
    }

    #[test]
    fn failed_scene_can_be_retried() {
        let mut state = AppState::new(&PlaceFinderOptions::default());
        handle_event(&mut state, Event::Start);
        handle_event(
            &mut state,
            Event::SceneLoaded(Err(SceneLoadError::EngineUnavailable)),
        );

        assert_eq!(
            state.map_status(),
            &MapStatus::Failed(SceneLoadError::EngineUnavailable)
        );
        assert!(handle_event(&mut state, Event::QueryChanged("berlin".into())).is_empty());

        let actions = handle_event(&mut state, Event::RetrySceneLoad);
        assert_eq!(actions, vec![Action::LoadScene(MapScheme::NormalDay)]);
        assert_eq!(state.map_status(), &MapStatus::Loading);
    }

    #[test]
    fn empty_query_yields_empty_suggestions() {
        let mut state = ready_state();
        let actions = handle_event(&mut state, Event::QueryChanged("ber".into()));
        let request = suggestion_request(&actions);
        handle_event(
            &mut state,
            Event::SuggestionsReceived {
                request,
                result: Ok(vec![place("Berlin", 52.5, 13.4)]),
            },
        );
        assert_eq!(state.visible_suggestions().len(), 1);

        let actions = handle_event(&mut state, Event::QueryChanged("   ".into()));

        assert!(actions.is_empty());
        assert!(state.suggestions().is_empty());
        assert!(state.visible_suggestions().is_empty());
        assert!(!state.is_suggestion_pending());
    }

    #[test]
    fn clear_empties_query_and_drops_in_flight_results() {
        let mut state = ready_state();
        let actions = handle_event(&mut state, Event::QueryChanged("berlin".into()));
        let request = suggestion_request(&actions);

        assert!(handle_event(&mut state, Event::ClearPressed).is_empty());
        handle_event(
            &mut state,
            Event::SuggestionsReceived {
                request,
                result: Ok(vec![place("Berlin", 52.5, 13.4)]),
            },
        );

        assert_eq!(state.query(), "");
        assert!(state.suggestions().is_empty());
    }

    #[test]
    fn submit_reissues_request() {
        let mut state = ready_state();
        let first = suggestion_request(&handle_event(
            &mut state,
            Event::QueryChanged("berlin".into()),
        ));
        let second = suggestion_request(&handle_event(&mut state, Event::SearchSubmitted));

        assert!(second > first);
    }

    #[test]
    fn selection_focuses_and_places_one_marker() {
        let mut state = ready_state();
        let berlin = place("Berlin", 52.51604, 13.37691);

        let actions = handle_event(&mut state, Event::SuggestionSelected(berlin.clone()));

        assert_matches!(
            actions.as_slice(),
            [
                Action::ReleaseSearchFocus,
                Action::FocusCamera(target),
                Action::PlaceMarker(marker),
                Action::RequestNearby { coordinates, .. },
            ] => {
                assert_eq!(target.coordinates, latlon!(52.51604, 13.37691));
                assert_eq!(target.measure, MapMeasure::distance(1000.0));
                assert_eq!(*marker, latlon!(52.51604, 13.37691));
                assert_eq!(*coordinates, latlon!(52.51604, 13.37691));
            }
        );
        assert_eq!(state.query(), "Berlin");
        assert!(!state.is_search_active());
        assert_eq!(state.selected_place(), Some(&berlin));
        assert_eq!(state.camera().coordinates, latlon!(52.51604, 13.37691));
    }

    #[test]
    fn query_completion_updates_bar_without_moving_map() {
        let mut state = ready_state();
        handle_event(&mut state, Event::QueryChanged("berlin h".into()));

        let actions = handle_event(
            &mut state,
            Event::SuggestionSelected(Place::new("berlin hotels")),
        );

        assert_eq!(actions, vec![Action::ReleaseSearchFocus]);
        assert_eq!(state.query(), "berlin hotels");
        assert!(!state.is_search_active());
        assert_eq!(state.selected_place(), None);
        assert!(!state.is_nearby_pending());
    }

    #[test]
    fn nearby_place_without_location_is_ignored() {
        let mut state = ready_state();

        let actions = handle_event(
            &mut state,
            Event::NearbyPlaceSelected(Place::new("Somewhere")),
        );

        assert!(actions.is_empty());
        assert_eq!(state.selected_place(), None);
    }

    #[test]
    fn selecting_two_places_issues_two_markers() {
        let mut state = ready_state();
        let p = handle_event(
            &mut state,
            Event::SuggestionSelected(place("P", 52.5, 13.4)),
        );
        let q = handle_event(
            &mut state,
            Event::NearbyPlaceSelected(place("Q", 52.6, 13.5)),
        );

        let markers: Vec<_> = p
            .iter()
            .chain(q.iter())
            .filter_map(|action| match action {
                Action::PlaceMarker(coordinates) => Some(*coordinates),
                _ => None,
            })
            .collect();
        assert_eq!(markers, vec![latlon!(52.5, 13.4), latlon!(52.6, 13.5)]);
    }

    #[test]
    fn stale_nearby_response_is_dropped() {
        let mut state = ready_state();
        let first = nearby_request(&handle_event(
            &mut state,
            Event::SuggestionSelected(place("P", 52.5, 13.4)),
        ));
        let second = nearby_request(&handle_event(
            &mut state,
            Event::NearbyPlaceSelected(place("Q", 48.85, 2.35)),
        ));

        handle_event(
            &mut state,
            Event::NearbyReceived {
                request: second,
                result: Ok(vec![place("Near Q", 48.86, 2.35)]),
            },
        );
        handle_event(
            &mut state,
            Event::NearbyReceived {
                request: first,
                result: Ok(vec![place("Near P", 52.5, 13.41)]),
            },
        );

        assert_eq!(state.nearby_places().len(), 1);
        assert_eq!(state.nearby_places()[0].title(), "Near Q");
        assert!(!state.is_nearby_pending());
    }

    #[test]
    fn search_error_keeps_list_and_sets_status() {
        let mut state = ready_state();
        let request = suggestion_request(&handle_event(
            &mut state,
            Event::QueryChanged("berlin".into()),
        ));
        handle_event(
            &mut state,
            Event::SuggestionsReceived {
                request,
                result: Ok(vec![place("Berlin", 52.5, 13.4)]),
            },
        );

        let request = suggestion_request(&handle_event(
            &mut state,
            Event::QueryChanged("berlin hbf".into()),
        ));
        handle_event(
            &mut state,
            Event::SuggestionsReceived {
                request,
                result: Err(SearchError::Quota),
            },
        );

        assert_eq!(state.suggestions().len(), 1);
        assert_eq!(
            state.status(),
            Some(&StatusMessage::SuggestionsFailed(SearchError::Quota))
        );

        let request = suggestion_request(&handle_event(&mut state, Event::SearchSubmitted));
        handle_event(
            &mut state,
            Event::SuggestionsReceived {
                request,
                result: Ok(vec![]),
            },
        );
        assert_eq!(state.status(), None);
    }

    #[test]
    fn dismiss_status() {
        let mut state = ready_state();
        let request = nearby_request(&handle_event(
            &mut state,
            Event::SuggestionSelected(place("P", 52.5, 13.4)),
        ));
        handle_event(
            &mut state,
            Event::NearbyReceived {
                request,
                result: Err(SearchError::Network("timeout".into())),
            },
        );
        assert!(state.status().is_some());

        handle_event(&mut state, Event::DismissStatus);
        assert!(state.status().is_none());
    }

    #[test]
    fn berlin_scenario() {
        let mut state = ready_state();
        let request = suggestion_request(&handle_event(
            &mut state,
            Event::QueryChanged("Berlin".into()),
        ));
        handle_event(
            &mut state,
            Event::SuggestionsReceived {
                request,
                result: Ok(vec![
                    place("Berlin, Deutschland", 52.51604, 13.37691)
                        .with_address(Address::new("Berlin, Deutschland")),
                    Place::new("berlin hotels"),
                ]),
            },
        );

        let berlin = state
            .visible_suggestions()
            .iter()
            .find(|place| place.title().contains("Berlin"))
            .cloned()
            .unwrap();

        let request = nearby_request(&handle_event(
            &mut state,
            Event::SuggestionSelected(berlin),
        ));
        assert_eq!(state.camera().coordinates, latlon!(52.51604, 13.37691));

        handle_event(
            &mut state,
            Event::NearbyReceived {
                request,
                result: Ok(vec![place("Pariser Platz", 52.51628, 13.3777)]),
            },
        );
        assert_eq!(state.nearby_places().len(), 1);
    }

    #[test]
    fn camera_moves_update_bias() {
        let mut state = ready_state();
        handle_event(&mut state, Event::CameraMoved(latlon!(50.0, 8.0)));

        let actions = handle_event(&mut state, Event::QueryChanged("cafe".into()));
        assert_matches!(
            actions.as_slice(),
            [Action::RequestSuggestions { query, .. }] => assert_eq!(query.at, latlon!(50.0, 8.0))
        );
    }
}
