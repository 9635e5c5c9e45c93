//! Geographic location of the observer.

use serde::{Deserialize, Serialize};

use crate::constants::COORDINATE_PRECISION;
use crate::error::{PanchangError, PanchangResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> PanchangResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(PanchangError::Config(format!(
                "latitude {} is outside -90..=90",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(PanchangError::Config(format!(
                "longitude {} is outside -180..=180",
                longitude
            )));
        }
        Ok(Location {
            latitude,
            longitude,
        })
    }

    /// "lat,lon" rounded to the cache precision, e.g. "19.0760,72.8777".
    ///
    /// Readings that only differ past the fourth decimal produce the same string.
    pub fn rounded(&self) -> String {
        format!(
            "{:.prec$},{:.prec$}",
            round_coordinate(self.latitude),
            round_coordinate(self.longitude),
            prec = COORDINATE_PRECISION as usize
        )
    }

    /// "lat,lon" as the remote provider expects it.
    pub fn coordinates(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    // `+ 0.0` folds -0.0 into 0.0 so both print the same
    (value * scale).round() / scale + 0.0
}
