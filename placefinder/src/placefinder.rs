use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::app::{handle_event, Action, AppState, Event};
use crate::config::PlaceFinderOptions;
use crate::map::{MapEngine, MapSurface};
use crate::messenger::Messenger;
use crate::search::{Place, SearchController, SearchEngine};

/// The place finder screen: application state wired to a map and a search engine.
///
/// All methods must be called from the UI thread, within a tokio runtime context. Search results
/// arrive from background tasks and are applied by [`PlaceFinder::process_responses`], which the
/// UI should call every frame.
pub struct PlaceFinder<M: MapEngine, S: SearchEngine + ?Sized + 'static> {
    state: AppState,
    surface: MapSurface<M>,
    search: SearchController<S>,
    responses: UnboundedReceiver<Event>,
    release_search_focus: bool,
}

impl<M: MapEngine, S: SearchEngine + ?Sized + 'static> PlaceFinder<M, S> {
    /// Creates a new place finder. Nothing is loaded until [`PlaceFinder::start`] is called.
    pub fn new(map_engine: M, search_engine: Arc<S>, options: PlaceFinderOptions) -> Self {
        let (sender, responses) = unbounded_channel();

        Self {
            state: AppState::new(&options),
            surface: MapSurface::new(map_engine),
            search: SearchController::new(search_engine, &options, sender),
            responses,
            release_search_focus: false,
        }
    }

    /// Sets the messenger notified when a search result is ready to be processed.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.search.set_messenger(Some(Arc::new(messenger)));
        self
    }

    /// Positions the camera at the initial target and loads the map scene.
    pub fn start(&mut self) {
        self.dispatch(Event::Start);
    }

    /// Selects a place: moves the camera to it, marks it and looks up places around it.
    pub fn select_place(&mut self, place: Place) {
        self.dispatch(Event::SuggestionSelected(place));
    }

    /// Applies the event and executes the resulting actions.
    pub fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for action in handle_event(&mut self.state, event) {
                if let Some(follow_up) = self.execute(action) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Applies all search results received so far. Returns the number of applied results.
    pub fn process_responses(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.responses.try_recv() {
            self.dispatch(event);
            count += 1;
        }

        count
    }

    /// Waits for the next search result and applies it.
    pub async fn wait_for_response(&mut self) -> bool {
        match self.responses.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Returns true once after the search field should lose keyboard focus.
    pub fn take_focus_release(&mut self) -> bool {
        std::mem::take(&mut self.release_search_focus)
    }

    /// Application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Map surface controller.
    pub fn surface(&self) -> &MapSurface<M> {
        &self.surface
    }

    /// Mutable map surface controller.
    pub fn surface_mut(&mut self) -> &mut MapSurface<M> {
        &mut self.surface
    }

    /// Search controller.
    pub fn search(&self) -> &SearchController<S> {
        &self.search
    }

    fn execute(&mut self, action: Action) -> Option<Event> {
        match action {
            Action::LoadScene(scheme) => {
                let result = self.surface.initialize(scheme, |surface| {
                    log::info!("Map is ready, camera at {:?}", surface.camera());
                });
                Some(Event::SceneLoaded(result))
            }
            Action::FocusCamera(target) => {
                self.surface.focus(target.coordinates, target.measure);
                None
            }
            Action::PlaceMarker(coordinates) => {
                self.surface.place_marker(coordinates);
                None
            }
            Action::RequestSuggestions { request, query } => {
                self.search.autosuggest(request, query);
                None
            }
            Action::RequestNearby {
                request,
                coordinates,
            } => {
                self.search.fetch_nearby(request, coordinates);
                None
            }
            Action::ReleaseSearchFocus => {
                self.release_search_focus = true;
                None
            }
        }
    }
}
