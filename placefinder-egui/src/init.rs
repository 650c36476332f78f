use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use eframe::AppCreator;
use galileo::control::UserEventHandler;
use galileo::{Map, MapBuilder};
use galileo_egui::EguiMapState;
use placefinder::config::{PlaceFinderOptions, SdkOptions};
use placefinder::placefinder_types::geo::GeoPoint;
use placefinder::{PlaceFinder, SdkEngine};
use tokio::runtime::Runtime;

use crate::app::{AppStorage, PlacefinderApp, STORAGE_KEY};
use crate::galileo_engine::GalileoMapEngine;

type CreationError = Box<dyn std::error::Error + Send + Sync>;

const APP_NAME: &str = "Placefinder";
const DEFAULT_TILE_CACHE: &str = ".tile_cache";
const INITIAL_VIEWPORT_HEIGHT: f64 = 800.0;

/// Starts the application: logging, async runtime, search engine and the window.
pub struct InitBuilder {
    sdk_options: SdkOptions,
    options: PlaceFinderOptions,
    native_options: Option<eframe::NativeOptions>,
    tile_cache: PathBuf,
}

impl InitBuilder {
    /// Creates a builder with the given credentials and default options.
    pub fn new(sdk_options: SdkOptions) -> Self {
        Self {
            sdk_options,
            options: PlaceFinderOptions::default(),
            native_options: None,
            tile_cache: PathBuf::from(DEFAULT_TILE_CACHE),
        }
    }

    /// Sets the search and map options.
    pub fn with_options(mut self, options: PlaceFinderOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the window options.
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    /// Sets the folder for cached map tiles.
    pub fn with_tile_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.tile_cache = path.into();
        self
    }

    /// Runs the application until the window is closed.
    ///
    /// Fails if the search engine cannot be initialized or the window cannot be created.
    pub fn init(self) -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let rt = Runtime::new().context("failed to create async runtime")?;
        let _enter = rt.enter();

        std::thread::spawn(move || {
            rt.block_on(async {
                loop {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            })
        });

        let sdk =
            SdkEngine::new(self.sdk_options).context("search engine initialization failed")?;

        let native_options = self.native_options.unwrap_or_default();
        let app_creator = app_creator(sdk, self.options, self.tile_cache);

        eframe::run_native(APP_NAME, native_options, app_creator)
            .map_err(|err| anyhow::anyhow!("failed to run the application: {err}"))
    }
}

fn app_creator<'app>(
    sdk: SdkEngine,
    mut options: PlaceFinderOptions,
    tile_cache: PathBuf,
) -> AppCreator<'app> {
    Box::new(move |cc: &eframe::CreationContext<'_>| -> Result<_, CreationError> {
        let stored: Option<AppStorage> = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, STORAGE_KEY));
        if let Some(camera) = stored.and_then(|stored| stored.camera) {
            log::debug!("Restoring camera position {camera}");
            options.initial_camera.coordinates = camera;
        }

        let ctx = cc.egui_ctx.clone();
        let render_state = cc
            .wgpu_render_state
            .clone()
            .ok_or("wgpu render state is not available")?;

        let handlers: Vec<Box<dyn UserEventHandler>> = vec![];
        let map_state =
            EguiMapState::new(create_map(&options), ctx.clone(), render_state, handlers);
        let engine = GalileoMapEngine::new(map_state, ctx.clone(), tile_cache);

        let finder = PlaceFinder::new(engine, Arc::new(sdk.search_engine()), options)
            .with_messenger(move || ctx.request_repaint());

        let app: Box<dyn eframe::App + 'app> = Box::new(PlacefinderApp::new(finder, sdk));
        Ok(app)
    })
}

fn create_map(options: &PlaceFinderOptions) -> Map {
    let camera = options.initial_camera;
    let lat = camera.coordinates.lat();

    let mut builder = MapBuilder::default().with_latlon(lat, camera.coordinates.lon());
    if let Some(resolution) = camera
        .measure
        .projected_resolution(lat, INITIAL_VIEWPORT_HEIGHT)
    {
        builder = builder.with_resolution(resolution);
    }

    builder.build()
}
