use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use galileo::galileo_types::geo::impls::GeoPoint2d;
use galileo::galileo_types::geo::{Crs, GeoPoint as _, NewGeoPoint};
use galileo::galileo_types::geometry_type::GeoSpace2d;
use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::layer::FeatureLayer;
use galileo::symbol::CirclePointSymbol;
use galileo::{Color, Messenger};
use galileo_egui::EguiMapState;
use placefinder::error::SceneLoadError;
use placefinder::map::{CameraTarget, MapEngine, MapScheme, MarkerId};
use placefinder::placefinder_types::geo::GeoPoint;
use placefinder::placefinder_types::GeoCoordinates;

type MarkerLayer = FeatureLayer<GeoPoint2d, GeoPoint2d, CirclePointSymbol, GeoSpace2d>;

const MARKER_COLOR: Color = Color::rgba(0, 112, 255, 255);
const MARKER_SIZE: f64 = 14.0;
const CAMERA_ANIMATION: Duration = Duration::from_millis(500);
const FALLBACK_VIEWPORT_HEIGHT: f64 = 800.0;

/// Raster tile service used for a map scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileSource {
    template: &'static str,
    attribution: &'static str,
    attribution_url: &'static str,
}

impl TileSource {
    pub(crate) fn for_scheme(scheme: MapScheme) -> Result<Self, SceneLoadError> {
        match scheme {
            MapScheme::NormalDay => Ok(Self {
                template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
                attribution: "© OpenStreetMap contributors",
                attribution_url: "https://www.openstreetmap.org/copyright",
            }),
            MapScheme::NormalNight => Ok(Self {
                template: "https://basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
                attribution: "© OpenStreetMap contributors © CARTO",
                attribution_url: "https://carto.com/attributions",
            }),
            MapScheme::Satellite => Ok(Self {
                template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
                attribution: "Tiles © Esri",
                attribution_url: "https://www.esri.com",
            }),
            MapScheme::HybridDay => Err(SceneLoadError::UnsupportedScheme(scheme.to_string())),
        }
    }

    pub(crate) fn url(&self, z: impl Display, x: impl Display, y: impl Display) -> String {
        self.template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Notifies the UI that tiles were loaded. Layers added after the map state is created do not
/// get the map state messenger, so the flag is checked by [`GalileoMapEngine::refresh`].
#[derive(Debug, Clone)]
struct TileMessenger {
    tiles_dirty: Arc<AtomicBool>,
    context: egui::Context,
}

impl Messenger for TileMessenger {
    fn request_redraw(&self) {
        log::trace!("Tiles updated");
        if !self.tiles_dirty.swap(true, Ordering::Relaxed) {
            self.context.request_repaint();
        }
    }
}

/// [`MapEngine`] that renders with galileo inside an egui panel.
///
/// The tile layer of the current scene is always the bottom layer and the marker layer, once
/// there are markers, is the top one.
pub struct GalileoMapEngine {
    state: EguiMapState,
    context: egui::Context,
    tile_cache: PathBuf,
    tiles_dirty: Arc<AtomicBool>,
    scene: Option<MapScheme>,
    markers: BTreeMap<MarkerId, GeoPoint2d>,
    next_marker: u64,
    has_marker_layer: bool,
}

impl GalileoMapEngine {
    /// Wraps the map state. Tiles are cached in `tile_cache`, one folder per scheme.
    pub fn new(state: EguiMapState, context: egui::Context, tile_cache: impl Into<PathBuf>) -> Self {
        Self {
            state,
            context,
            tile_cache: tile_cache.into(),
            tiles_dirty: Arc::new(AtomicBool::new(false)),
            scene: None,
            markers: BTreeMap::new(),
            next_marker: 0,
            has_marker_layer: false,
        }
    }

    /// Map state to render.
    pub fn state_mut(&mut self) -> &mut EguiMapState {
        &mut self.state
    }

    /// Redraws the map if tiles were loaded since the last call. Call once per frame.
    pub fn refresh(&mut self) {
        if self.tiles_dirty.swap(false, Ordering::Relaxed) {
            self.state.request_redraw();
        }
    }

    /// Point in the center of the map.
    pub fn center(&self) -> Option<GeoCoordinates> {
        let position = self.state.map().view().position()?;
        GeoCoordinates::new(position.lat(), position.lon()).ok()
    }

    fn viewport_height(&self) -> f64 {
        let height = self.context.screen_rect().height() as f64;
        if height >= 1.0 {
            height
        } else {
            FALLBACK_VIEWPORT_HEIGHT
        }
    }

    fn update_marker_layer(&mut self) {
        let layer: MarkerLayer = FeatureLayer::new(
            self.markers.values().copied().collect(),
            CirclePointSymbol::new(MARKER_COLOR, MARKER_SIZE),
            Crs::WGS84,
        );

        let layers = self.state.map_mut().layers_mut();
        if self.has_marker_layer {
            layers.pop();
        }
        layers.push(layer);
        self.has_marker_layer = true;

        self.state.request_redraw();
    }
}

impl MapEngine for GalileoMapEngine {
    fn load_scene(&mut self, scheme: MapScheme) -> Result<(), SceneLoadError> {
        let source = TileSource::for_scheme(scheme)?;
        let messenger = TileMessenger {
            tiles_dirty: self.tiles_dirty.clone(),
            context: self.context.clone(),
        };

        let layer = RasterTileLayerBuilder::new_rest(move |index| {
            source.url(index.z, index.x, index.y)
        })
        .with_file_cache_checked(self.tile_cache.join(scheme.to_string()))
        .with_messenger(messenger)
        .with_attribution(
            source.attribution.to_string(),
            source.attribution_url.to_string(),
        )
        .build()
        .map_err(|err| SceneLoadError::Resources(err.to_string()))?;

        let layers = self.state.map_mut().layers_mut();
        if self.scene.is_some() {
            layers.remove(0);
        }
        layers.insert(0, layer);
        self.scene = Some(scheme);

        self.state.request_redraw();
        Ok(())
    }

    fn look_at(&mut self, target: CameraTarget) {
        let lat = target.coordinates.lat();
        let position = GeoPoint2d::latlon(lat, target.coordinates.lon());
        let resolution = target
            .measure
            .projected_resolution(lat, self.viewport_height());

        let animate = self.scene.is_some();
        let map = self.state.map_mut();
        let mut view = map.view().with_position(&position);
        match resolution {
            Some(resolution) => view = view.with_resolution(resolution),
            None => log::warn!("Cannot position camera at {target:?}, keeping the zoom"),
        }

        if animate {
            map.animate_to(view, CAMERA_ANIMATION);
        } else {
            map.set_view(view);
        }
    }

    fn add_marker(&mut self, coordinates: GeoCoordinates) -> MarkerId {
        self.next_marker += 1;
        let marker = MarkerId::new(self.next_marker);

        self.markers.insert(
            marker,
            GeoPoint2d::latlon(coordinates.lat(), coordinates.lon()),
        );
        self.update_marker_layer();

        marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if self.markers.remove(&marker).is_some() {
            self.update_marker_layer();
        }
    }
}
