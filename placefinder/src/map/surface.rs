use placefinder_types::{GeoCoordinates, MapMeasure};

use super::{CameraTarget, MapEngine, MapScheme, MarkerId, SceneState};
use crate::error::SceneLoadError;

/// Controller of the map display surface.
///
/// Keeps a single selection marker slot: placing a marker replaces the previous one instead of
/// adding to it.
pub struct MapSurface<E: MapEngine> {
    engine: E,
    scene: SceneState,
    camera: Option<CameraTarget>,
    marker: Option<MarkerId>,
}

impl<E: MapEngine> MapSurface<E> {
    /// Creates a controller for the given engine. No scene is loaded.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            scene: SceneState::NotLoaded,
            camera: None,
            marker: None,
        }
    }

    /// Loads the scene and calls `on_ready` once it is loaded.
    ///
    /// `on_ready` is never called if loading fails, and is called at most once over the lifetime
    /// of the surface: once a scene is ready, further calls return `Ok(())` without reloading.
    /// A failed load can be retried by calling this method again.
    pub fn initialize(
        &mut self,
        scheme: MapScheme,
        on_ready: impl FnOnce(&mut Self),
    ) -> Result<(), SceneLoadError> {
        if let SceneState::Ready(loaded) = self.scene {
            log::debug!("Map scene {loaded} is already loaded, ignoring request for {scheme}");
            return Ok(());
        }

        match self.engine.load_scene(scheme) {
            Ok(()) => {
                log::info!("Map scene {scheme} loaded");
                self.scene = SceneState::Ready(scheme);
                on_ready(self);
                Ok(())
            }
            Err(error) => {
                log::warn!("Loading map scene {scheme} failed: {error}");
                self.scene = SceneState::Failed(error.clone());
                Err(error)
            }
        }
    }

    /// Moves the camera to the given point.
    pub fn focus(&mut self, coordinates: GeoCoordinates, measure: MapMeasure) {
        let target = CameraTarget::new(coordinates, measure);
        self.engine.look_at(target);
        self.camera = Some(target);
    }

    /// Shows the selection marker at the given point, removing the previous one.
    pub fn place_marker(&mut self, coordinates: GeoCoordinates) -> MarkerId {
        self.clear_marker();

        let marker = self.engine.add_marker(coordinates);
        self.marker = Some(marker);
        marker
    }

    /// Removes the selection marker if there is one.
    pub fn clear_marker(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.engine.remove_marker(marker);
        }
    }

    /// Current selection marker.
    pub fn marker(&self) -> Option<MarkerId> {
        self.marker
    }

    /// Last camera target set through this controller.
    pub fn camera(&self) -> Option<CameraTarget> {
        self.camera
    }

    /// State of the scene.
    pub fn scene_state(&self) -> &SceneState {
        &self.scene
    }

    /// Map engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable reference to the map engine.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
