//! Constants module for astronomical calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in meters (per IAU 2012 Resolution B2)
pub const AU_M: f64 = 149_597_870_700.0;
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;
/// Earth's equatorial radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6_378.1366;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// Minutes in a day
pub const DAY_MIN: f64 = 1_440.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian century
pub const JULIAN_CENTURY: f64 = 36_525.0;
/// Length of the sidereal day in mean solar days
pub const SIDEREAL_DAY: f64 = 0.997_269_566_33;
/// Offset between Julian date and Unix epoch (1970-01-01T00:00:00)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;
/// Mean obliquity of the ecliptic at J2000.0 in radians (84381.448")
pub const OBLIQUITY_J2000: f64 = 23.439_291_111 * DEG2RAD;

// Physics
/// Speed of light in m/s
pub const C: f64 = 299_792_458.0;
/// Gaussian gravitational constant k, au^1.5/day
pub const GAUSS_K: f64 = 0.017_202_098_95;
/// Barker's equation scale 3k/√2, for time in days and distance in au
pub const BARKER_C: f64 = 3.0 * GAUSS_K / std::f64::consts::SQRT_2;

// Derived constants
/// Speed of light in AU/day
pub const C_AUDAY: f64 = C * DAY_S / AU_M;

// Calendar constants
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i32 = 2_299_161;
