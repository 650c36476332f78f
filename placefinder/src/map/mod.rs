//! Map surface: loading a scene, positioning the camera and showing the selection marker.
//!
//! Rendering and camera math are done by a [`MapEngine`] implementation. [`MapSurface`] only
//! issues commands to it and keeps track of the scene state and of the single selection marker.

use std::fmt::{Display, Formatter};

use placefinder_types::{GeoCoordinates, MapMeasure};
use serde::{Deserialize, Serialize};

use crate::error::SceneLoadError;

mod surface;

pub use surface::MapSurface;

/// Visual scheme the map engine renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapScheme {
    /// Default street map for daylight.
    #[default]
    NormalDay,
    /// Street map with dark colors.
    NormalNight,
    /// Satellite imagery.
    Satellite,
    /// Satellite imagery with streets and labels on top.
    HybridDay,
}

impl Display for MapScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MapScheme::NormalDay => "normal-day",
            MapScheme::NormalNight => "normal-night",
            MapScheme::Satellite => "satellite",
            MapScheme::HybridDay => "hybrid-day",
        };

        f.write_str(name)
    }
}

/// Point the camera looks at and how far it is from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    /// Target point.
    pub coordinates: GeoCoordinates,
    /// Distance or zoom of the camera.
    pub measure: MapMeasure,
}

impl CameraTarget {
    /// Creates a new camera target.
    pub fn new(coordinates: GeoCoordinates, measure: MapMeasure) -> Self {
        Self {
            coordinates,
            measure,
        }
    }
}

/// Handle of a marker added to a map engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

impl MarkerId {
    /// Wraps an engine specific marker identifier.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Engine specific marker identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// State of the scene loading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SceneState {
    /// Nothing was loaded yet.
    #[default]
    NotLoaded,
    /// The scene with the given scheme is shown.
    Ready(MapScheme),
    /// The last attempt to load a scene failed.
    Failed(SceneLoadError),
}

impl SceneState {
    /// Returns true if a scene was loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self, SceneState::Ready(_))
    }
}

/// Rendering engine behind a [`MapSurface`].
///
/// All methods are called from the UI thread.
pub trait MapEngine {
    /// Loads the given visual scheme. The map is not usable until this succeeds.
    fn load_scene(&mut self, scheme: MapScheme) -> Result<(), SceneLoadError>;
    /// Moves the camera to the target.
    fn look_at(&mut self, target: CameraTarget);
    /// Shows a marker at the given point.
    fn add_marker(&mut self, coordinates: GeoCoordinates) -> MarkerId;
    /// Removes a marker previously returned by [`MapEngine::add_marker`]. Unknown ids are ignored.
    fn remove_marker(&mut self, marker: MarkerId);
}

impl<T: MapEngine + ?Sized> MapEngine for Box<T> {
    fn load_scene(&mut self, scheme: MapScheme) -> Result<(), SceneLoadError> {
        (**self).load_scene(scheme)
    }

    fn look_at(&mut self, target: CameraTarget) {
        (**self).look_at(target)
    }

    fn add_marker(&mut self, coordinates: GeoCoordinates) -> MarkerId {
        (**self).add_marker(coordinates)
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        (**self).remove_marker(marker)
    }
}
