//! Desktop place finder built on [`placefinder`], rendering the map with `galileo` in an `egui`
//! window.

mod app;
mod galileo_engine;
mod init;

pub use app::PlacefinderApp;
pub use galileo_engine::GalileoMapEngine;
pub use init::InitBuilder;
