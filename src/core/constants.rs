//! Physical constants and system parameters

/// False easting of the CH1903 grid origin at Bern (m)
pub const CH1903_FALSE_EASTING: f64 = 600_000.0;

/// False northing of the CH1903 grid origin at Bern (m)
pub const CH1903_FALSE_NORTHING: f64 = 200_000.0;

/// Latitude of the Bern reference point in arc-seconds
pub const BERN_LATITUDE_ARC_SECONDS: f64 = 169_028.66;

/// Longitude of the Bern reference point in arc-seconds
pub const BERN_LONGITUDE_ARC_SECONDS: f64 = 26_782.5;

/// Sensor width of a full-frame camera body (mm)
pub const FULL_FRAME_SENSOR_WIDTH_MM: f64 = 35.9;

/// Horizontal resolution of a full-frame camera body (pixels)
pub const FULL_FRAME_SENSOR_WIDTH_PX: f64 = 7360.0;

/// Magnetic declination over Switzerland, place and time dependent (degrees)
pub const DEFAULT_MAGNETIC_DECLINATION_DEG: f64 = 1.56;
