//! Observer sites on the Earth and the rotation of the Earth
//!
//! Sidereal time follows the IAU 1982 GMST polynomial. The Julian date is
//! used as UT1 directly; the ~1 minute difference between TT and UT1 shifts
//! event times by the same amount and is otherwise harmless here.

use crate::constants::{DEG2RAD, J2000, JULIAN_CENTURY, TAU};
use crate::framelib::{equatorial_to_horizontal, Equatorial, HorizonSample};
use serde::{Deserialize, Serialize};

/// Greenwich mean sidereal time in radians, [0, 2π)
pub fn gmst(jd: f64) -> f64 {
    let d = jd - J2000;
    let t = d / JULIAN_CENTURY;
    let degrees = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    (degrees * DEG2RAD).rem_euclid(TAU)
}

/// A geographic observing site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topos {
    /// Geodetic latitude in radians, north positive
    pub latitude: f64,
    /// Longitude in radians, east positive
    pub longitude: f64,
}

impl Topos {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn from_degrees(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self::new(latitude_deg * DEG2RAD, longitude_deg * DEG2RAD)
    }

    /// Local mean sidereal time in radians, [0, 2π)
    pub fn local_sidereal_time(&self, jd: f64) -> f64 {
        (gmst(jd) + self.longitude).rem_euclid(TAU)
    }

    /// Where a geocentric direction appears on this site's horizon at `jd`
    pub fn horizontal(&self, position: &Equatorial, distance: f64, jd: f64) -> HorizonSample {
        equatorial_to_horizontal(
            position,
            distance,
            self.latitude,
            self.local_sidereal_time(jd),
            jd,
        )
    }
}

impl Default for Topos {
    /// Greenwich, on the prime meridian
    fn default() -> Self {
        Self::from_degrees(51.4769, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gmst_at_j2000() {
        assert_relative_eq!(gmst(J2000), 280.460_618_37 * DEG2RAD, epsilon = 1e-12);
    }

    #[test]
    fn test_gmst_meeus_example() {
        // 1987 April 10, 0h UT: 13h10m46.3668s
        let hours = gmst(2_446_895.5) / TAU * 24.0;
        let expected = 13.0 + 10.0 / 60.0 + 46.3668 / 3600.0;
        assert_relative_eq!(hours, expected, epsilon = 1e-7);
    }

    #[test]
    fn test_sidereal_day_returns_same_lst() {
        use crate::constants::SIDEREAL_DAY;
        let site = Topos::from_degrees(-33.9, 18.4);
        let a = site.local_sidereal_time(2_460_000.3);
        let b = site.local_sidereal_time(2_460_000.3 + SIDEREAL_DAY);
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }

    #[test]
    fn test_longitude_offsets_sidereal_time() {
        let jd = 2_455_000.0;
        let east = Topos::from_degrees(0.0, 90.0);
        let lst = east.local_sidereal_time(jd);
        let expected = (gmst(jd) + TAU / 4.0).rem_euclid(TAU);
        assert_relative_eq!(lst, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_topos_json() {
        let site = Topos::from_degrees(45.0, -75.0);
        let json = serde_json::to_string(&site).unwrap();
        let back: Topos = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(back.latitude, site.latitude, epsilon = 1e-15);
        assert_relative_eq!(back.longitude, site.longitude, epsilon = 1e-15);
    }
}
