use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Resolution of the z-level 0 of the standard Web Mercator tile scheme with 256 pixel tiles.
const WEB_MERCATOR_Z0_RESOLUTION: f64 = 156543.03392800014;

/// Vertical field of view of the camera that looks straight down at the map.
const CAMERA_FIELD_OF_VIEW_DEG: f64 = 45.0;

/// The way a [`MapMeasure`] value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum MeasureKind {
    /// Distance in meters between the camera and the target point on the ground.
    Distance,
    /// Z-level of the standard Web Mercator tile scheme.
    ZoomLevel,
}

/// How close the camera is to the map.
///
/// ```
/// use placefinder_types::{MapMeasure, MeasureKind};
///
/// let measure = MapMeasure::distance(1000.0);
/// assert_eq!(measure.kind(), MeasureKind::Distance);
/// assert_eq!(measure.value(), 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MapMeasure {
    kind: MeasureKind,
    value: f64,
}

impl MapMeasure {
    /// Camera at `meters` from the target point.
    pub fn distance(meters: f64) -> Self {
        Self {
            kind: MeasureKind::Distance,
            value: meters,
        }
    }

    /// Camera at the given Web Mercator z-level.
    pub fn zoom_level(level: f64) -> Self {
        Self {
            kind: MeasureKind::ZoomLevel,
            value: level,
        }
    }

    /// Kind of the measure.
    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    /// Raw value of the measure.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the measure back if its value can position a camera: a positive finite distance or
    /// a non-negative finite z-level.
    pub fn validated(self) -> Result<Self, GeoError> {
        let valid = match self.kind {
            MeasureKind::Distance => self.value.is_finite() && self.value > 0.0,
            MeasureKind::ZoomLevel => self.value.is_finite() && self.value >= 0.0,
        };

        if valid {
            Ok(self)
        } else {
            Err(GeoError::Measure(self.value))
        }
    }

    /// Size of one screen pixel in Web Mercator projected meters when the camera looks at a
    /// point at `latitude` (degrees) through a viewport `viewport_height` pixels high.
    ///
    /// Returns `None` for invalid measures, latitudes at the poles and empty viewports.
    pub fn projected_resolution(&self, latitude: f64, viewport_height: f64) -> Option<f64> {
        self.validated().ok()?;

        match self.kind {
            MeasureKind::ZoomLevel => Some(WEB_MERCATOR_Z0_RESOLUTION / 2f64.powf(self.value)),
            MeasureKind::Distance => {
                if !viewport_height.is_finite() || viewport_height < 1.0 {
                    return None;
                }

                let scale = latitude.to_radians().cos();
                if !scale.is_finite() || scale <= f64::EPSILON {
                    return None;
                }

                let half_fov = (CAMERA_FIELD_OF_VIEW_DEG / 2.0).to_radians();
                let ground_height = 2.0 * self.value * half_fov.tan();
                Some(ground_height / viewport_height / scale)
            }
        }
    }
}
