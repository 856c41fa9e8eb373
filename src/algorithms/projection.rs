//! Approximate conversion between the CH1903/LV03 military grid and WGS84
//!
//! The forward and backward directions use two independently fitted
//! polynomial sets around the Bern reference point. They are empirical
//! approximations, not exact inverses of each other; inside the Swiss
//! calibration region they agree to well under a meter. Both directions are
//! total over the real plane and never fail, although accuracy degrades far
//! from the calibration region.

use crate::core::constants::{
    BERN_LATITUDE_ARC_SECONDS, BERN_LONGITUDE_ARC_SECONDS, CH1903_FALSE_EASTING,
    CH1903_FALSE_NORTHING,
};
use crate::core::types::{GeodeticCoordinate, PlanarCoordinate};

/// Convert a grid position (and optional local height) to WGS84.
pub fn planar_to_geodetic(p: &PlanarCoordinate, height: Option<f64>) -> GeodeticCoordinate {
    // Auxiliary values relative to Bern, in units of 1000 km
    let y_aux = (p.east - CH1903_FALSE_EASTING) / 1_000_000.0;
    let x_aux = (p.north - CH1903_FALSE_NORTHING) / 1_000_000.0;

    let lat = 16.902_389_2 + 3.238_272 * x_aux
        - 0.270_978 * y_aux.powi(2)
        - 0.002_528 * x_aux.powi(2)
        - 0.044_7 * y_aux.powi(2) * x_aux
        - 0.014_0 * x_aux.powi(3);

    let lng = 2.677_909_4 + 4.728_982 * y_aux
        + 0.791_484 * y_aux * x_aux
        + 0.130_6 * y_aux * x_aux.powi(2)
        - 0.043_6 * y_aux.powi(3);

    // Unit 10000" to 1" and seconds to decimal degrees
    GeodeticCoordinate {
        latitude: lat * 100.0 / 36.0,
        longitude: lng * 100.0 / 36.0,
        height: height.map(|h| local_to_ellipsoidal_height(p, h)),
    }
}

/// Convert a WGS84 position to the grid. The height component, if any, is
/// handled separately by [`ellipsoidal_to_local_height`].
pub fn geodetic_to_planar(g: &GeodeticCoordinate) -> PlanarCoordinate {
    let (lat_aux, lng_aux) = bern_aux(g);

    let east = 600_072.37 + 211_455.93 * lng_aux
        - 10_938.51 * lng_aux * lat_aux
        - 0.36 * lng_aux * lat_aux.powi(2)
        - 44.54 * lng_aux.powi(3);

    let north = 200_147.07 + 308_807.95 * lat_aux
        + 3_745.25 * lng_aux.powi(2)
        + 76.63 * lat_aux.powi(2)
        - 194.56 * lng_aux.powi(2) * lat_aux
        + 119.79 * lat_aux.powi(3);

    PlanarCoordinate { east, north }
}

/// Correct a local height to an ellipsoidal height at the given grid position.
pub fn local_to_ellipsoidal_height(p: &PlanarCoordinate, height: f64) -> f64 {
    let y_aux = (p.east - CH1903_FALSE_EASTING) / 1_000_000.0;
    let x_aux = (p.north - CH1903_FALSE_NORTHING) / 1_000_000.0;
    height + 49.55 - 12.60 * y_aux - 22.64 * x_aux
}

/// Correct an ellipsoidal height to a local height at the given WGS84 position.
pub fn ellipsoidal_to_local_height(g: &GeodeticCoordinate, height: f64) -> f64 {
    let (lat_aux, lng_aux) = bern_aux(g);
    height - 49.55 + 2.73 * lng_aux + 6.94 * lat_aux
}

/// Auxiliary arc-second offsets from Bern, in units of 10000"
fn bern_aux(g: &GeodeticCoordinate) -> (f64, f64) {
    let lat_sec = sexagesimal_to_seconds(decimal_to_sexagesimal(g.latitude));
    let lng_sec = sexagesimal_to_seconds(decimal_to_sexagesimal(g.longitude));
    (
        (lat_sec - BERN_LATITUDE_ARC_SECONDS) / 10_000.0,
        (lng_sec - BERN_LONGITUDE_ARC_SECONDS) / 10_000.0,
    )
}

/// Pack decimal degrees into the fixed-point sexagesimal form `dd.mmss`.
///
/// This is a packing, not a unit conversion: the minutes occupy the first two
/// fractional digits and the seconds the next two, so the packed value is
/// only meaningful to [`sexagesimal_to_seconds`] and
/// [`sexagesimal_to_decimal`].
pub fn decimal_to_sexagesimal(dec: f64) -> f64 {
    let deg = dec.floor();
    let min = ((dec - deg) * 60.0).floor();
    let sec = ((dec - deg) * 60.0 - min) * 60.0;
    deg + min / 100.0 + sec / 10_000.0
}

/// Unpack a `dd.mmss` sexagesimal value into total arc-seconds.
pub fn sexagesimal_to_seconds(packed: f64) -> f64 {
    let deg = packed.floor();
    let min = ((packed - deg) * 100.0).floor();
    let sec = ((packed - deg) * 100.0 - min) * 100.0;
    sec + min * 60.0 + deg * 3_600.0
}

/// Unpack a `dd.mmss` sexagesimal value into decimal degrees.
pub fn sexagesimal_to_decimal(packed: f64) -> f64 {
    let deg = packed.floor();
    let min = ((packed - deg) * 100.0).floor();
    let sec = ((packed - deg) * 100.0 - min) * 100.0;
    deg + min / 60.0 + sec / 3_600.0
}
