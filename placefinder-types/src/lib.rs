//! Basic geographic types shared by the Placefinder crates: coordinates in degrees (see
//! [`GeoCoordinates`]) and the distance based zoom measure used to position a map camera (see
//! [`MapMeasure`]).

pub mod error;
pub mod geo;
mod measure;

pub use geo::{Datum, GeoCoordinates, GeoPoint, NewGeoPoint};
pub use measure::{MapMeasure, MeasureKind};
