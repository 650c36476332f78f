//! Engines for tests: a map engine that records commands and an in-memory search engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use placefinder_types::{latlon, GeoCoordinates};

use crate::error::{SceneLoadError, SearchError};
use crate::map::{CameraTarget, MapEngine, MapScheme, MarkerId};
use crate::search::{Address, Place, SearchEngine, SearchOptions, TextQuery};

/// Command received by a [`RecordingMapEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    /// [`MapEngine::load_scene`]
    LoadScene(MapScheme),
    /// [`MapEngine::look_at`]
    LookAt(CameraTarget),
    /// [`MapEngine::add_marker`] and the id it returned.
    AddMarker(MarkerId, GeoCoordinates),
    /// [`MapEngine::remove_marker`]
    RemoveMarker(MarkerId),
}

/// Map engine that draws nothing and remembers every command.
#[derive(Debug, Default)]
pub struct RecordingMapEngine {
    commands: Vec<MapCommand>,
    scene_failures: usize,
    scene_error: Option<SceneLoadError>,
    next_marker: u64,
    markers: BTreeMap<MarkerId, GeoCoordinates>,
    camera: Option<CameraTarget>,
}

impl RecordingMapEngine {
    /// Makes the next `count` scene loads fail with the error.
    pub fn with_scene_failures(mut self, count: usize, error: SceneLoadError) -> Self {
        self.scene_failures = count;
        self.scene_error = Some(error);
        self
    }

    /// All commands received so far.
    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Number of markers ever added.
    pub fn added_markers(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, MapCommand::AddMarker(..)))
            .count()
    }

    /// Positions of markers that were added and not removed.
    pub fn visible_markers(&self) -> Vec<GeoCoordinates> {
        self.markers.values().copied().collect()
    }

    /// Last camera target.
    pub fn camera(&self) -> Option<CameraTarget> {
        self.camera
    }
}

impl MapEngine for RecordingMapEngine {
    fn load_scene(&mut self, scheme: MapScheme) -> Result<(), SceneLoadError> {
        self.commands.push(MapCommand::LoadScene(scheme));

        if self.scene_failures > 0 {
            self.scene_failures -= 1;
            return Err(self
                .scene_error
                .clone()
                .unwrap_or(SceneLoadError::EngineUnavailable));
        }

        Ok(())
    }

    fn look_at(&mut self, target: CameraTarget) {
        self.commands.push(MapCommand::LookAt(target));
        self.camera = Some(target);
    }

    fn add_marker(&mut self, coordinates: GeoCoordinates) -> MarkerId {
        self.next_marker += 1;
        let marker = MarkerId::new(self.next_marker);

        self.commands.push(MapCommand::AddMarker(marker, coordinates));
        self.markers.insert(marker, coordinates);
        marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.commands.push(MapCommand::RemoveMarker(marker));
        self.markers.remove(&marker);
    }
}

/// Search engine over a fixed list of places.
///
/// Suggestions are places whose title contains the query text (ignoring case). Nearby places are
/// places with a location within the nearby radius, closest first.
#[derive(Debug, Default)]
pub struct StaticSearchEngine {
    places: Vec<Place>,
    nearby_radius: f64,
    suggest_delays: HashMap<String, Duration>,
    nearby_delays: Vec<(GeoCoordinates, Duration)>,
    failure: Mutex<Option<SearchError>>,
    suggest_calls: AtomicUsize,
    nearby_calls: AtomicUsize,
}

impl StaticSearchEngine {
    /// Default radius of the nearby lookup in meters.
    pub const NEARBY_RADIUS: f64 = 3_000.0;

    /// Creates an engine over the places.
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            places,
            nearby_radius: Self::NEARBY_RADIUS,
            ..Default::default()
        }
    }

    /// A few places in Berlin and Potsdam, and one query completion.
    pub fn berlin() -> Self {
        let place = |title: &str, address: &str, lat: f64, lon: f64| {
            Place::new(title)
                .with_address(Address::new(address))
                .with_coordinates(latlon!(lat, lon))
        };

        Self::new(vec![
            place("Berlin, Deutschland", "Berlin, Deutschland", 52.51604, 13.37691)
                .with_result_type("locality"),
            place(
                "Berlin Hauptbahnhof",
                "Europaplatz 1, 10557 Berlin",
                52.52508,
                13.36941,
            ),
            place(
                "Brandenburger Tor",
                "Pariser Platz, 10117 Berlin",
                52.51628,
                13.3777,
            ),
            place(
                "Invalidenstraße 116",
                "Invalidenstraße 116, 10115 Berlin",
                52.53098,
                13.38492,
            )
            .with_result_type("houseNumber"),
            place(
                "Berliner Straße, Potsdam",
                "Berliner Straße, 14467 Potsdam",
                52.4005,
                13.07226,
            )
            .with_result_type("street"),
            place(
                "Schloss Sanssouci",
                "Maulbeerallee, 14469 Potsdam",
                52.40426,
                13.03845,
            ),
            Place::new("berlin hotels").with_result_type("categoryQuery"),
        ])
    }

    /// Sets the radius of the nearby lookup.
    pub fn with_nearby_radius(mut self, meters: f64) -> Self {
        self.nearby_radius = meters;
        self
    }

    /// Delays suggestions for the query text.
    pub fn with_suggest_delay(mut self, text: &str, delay: Duration) -> Self {
        self.suggest_delays.insert(text.trim().to_lowercase(), delay);
        self
    }

    /// Delays nearby lookups around the point.
    pub fn with_nearby_delay(mut self, coordinates: GeoCoordinates, delay: Duration) -> Self {
        self.nearby_delays.push((coordinates, delay));
        self
    }

    /// Makes all requests fail with the error until called with `None`.
    pub fn fail_with(&self, error: Option<SearchError>) {
        *self.failure.lock() = error;
    }

    /// Number of suggestion requests received.
    pub fn suggest_calls(&self) -> usize {
        self.suggest_calls.load(Ordering::Relaxed)
    }

    /// Number of nearby requests received.
    pub fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::Relaxed)
    }

    fn check_failure(&self) -> Result<(), SearchError> {
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchEngine for StaticSearchEngine {
    async fn suggest(
        &self,
        query: &TextQuery,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, SearchError> {
        self.suggest_calls.fetch_add(1, Ordering::Relaxed);

        let text = query.text.trim().to_lowercase();
        if let Some(delay) = self.suggest_delays.get(&text) {
            tokio::time::sleep(*delay).await;
        }
        self.check_failure()?;

        Ok(self
            .places
            .iter()
            .filter(|place| place.title().to_lowercase().contains(&text))
            .take(options.max_items)
            .cloned()
            .collect())
    }

    async fn nearby(
        &self,
        coordinates: GeoCoordinates,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, SearchError> {
        self.nearby_calls.fetch_add(1, Ordering::Relaxed);

        let delay = self
            .nearby_delays
            .iter()
            .find(|(point, _)| *point == coordinates)
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;

        let mut places: Vec<(f64, Place)> = self
            .places
            .iter()
            .filter_map(|place| {
                let distance = place.coordinates()?.distance_to(&coordinates);
                (distance <= self.nearby_radius)
                    .then(|| (distance, place.clone().with_distance(distance.round())))
            })
            .collect();
        places.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(places
            .into_iter()
            .take(options.max_items)
            .map(|(_, place)| place)
            .collect())
    }
}
