//! Placefinder is the core of a single-screen map application: search places by free text, pick
//! one of the suggestions, see it on the map with a marker and get a list of addresses around it.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use placefinder::app::Event;
//! use placefinder::config::{PlaceFinderOptions, SdkOptions};
//! use placefinder::{PlaceFinder, SdkEngine};
//! # use placefinder::map::{CameraTarget, MapEngine, MapScheme, MarkerId};
//! # use placefinder::error::SceneLoadError;
//! # use placefinder::placefinder_types::GeoCoordinates;
//! # struct MyMap;
//! # impl MapEngine for MyMap {
//! #     fn load_scene(&mut self, _: MapScheme) -> Result<(), SceneLoadError> { Ok(()) }
//! #     fn look_at(&mut self, _: CameraTarget) {}
//! #     fn add_marker(&mut self, _: GeoCoordinates) -> MarkerId { MarkerId::new(1) }
//! #     fn remove_marker(&mut self, _: MarkerId) {}
//! # }
//!
//! # tokio_test::block_on(async {
//! let engine = SdkEngine::new(SdkOptions::from_env()?)?;
//! let mut finder = PlaceFinder::new(
//!     MyMap,
//!     Arc::new(engine.search_engine()),
//!     PlaceFinderOptions::default(),
//! );
//!
//! finder.start();
//! finder.dispatch(Event::QueryChanged("Berlin".into()));
//! finder.wait_for_response().await;
//!
//! for place in finder.state().visible_suggestions() {
//!     println!("{}", place.title());
//! }
//! # Ok::<(), placefinder::error::PlacefinderError>(())
//! # });
//! ```
//!
//! # Main components
//!
//! * [`MapSurface`](map::MapSurface) drives a [`MapEngine`](map::MapEngine): it loads the scene,
//!   moves the camera and keeps the single selection marker.
//! * [`SearchController`](search::SearchController) runs [`SearchEngine`](search::SearchEngine)
//!   requests in background tasks and reports results tagged with their request id.
//! * [`app`] holds the screen state and the pure [`handle_event`](app::handle_event) function
//!   that turns user input and search results into state changes and [`Action`](app::Action)s.
//! * [`PlaceFinder`] ties them together and executes the actions.
//!
//! The map rendering itself is not part of this crate. See the `placefinder-egui` crate for a
//! desktop application that renders the map with `galileo`.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod app;
pub(crate) mod async_runtime;
pub mod config;
mod engine;
pub mod error;
pub mod map;
mod messenger;
mod placefinder;
pub mod search;
mod sequence;

#[cfg(any(test, feature = "_tests"))]
pub mod fixtures;

pub use engine::SdkEngine;
pub use messenger::{DummyMessenger, Messenger};
pub use placefinder::PlaceFinder;
pub use sequence::{RequestId, RequestSequence};

// Reexport placefinder_types
pub use placefinder_types;
