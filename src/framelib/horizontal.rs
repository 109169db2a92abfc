//! Equatorial to horizontal (altitude/azimuth) projection

use super::inertial::Equatorial;
use crate::constants::TAU;
use serde::{Deserialize, Serialize};

/// One point on an object's apparent trajectory for an observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonSample {
    /// Julian date
    pub time: f64,
    /// Radians from north through east, [0, 2π)
    pub azimuth: f64,
    /// Radians above the horizon
    pub elevation: f64,
    /// Distance from the observer in au (zero for objects at infinity)
    pub distance: f64,
}

/// Hour angle of a direction, in (−π, π]
pub fn hour_angle(local_sidereal_time: f64, ra: f64) -> f64 {
    crate::orbit::normalize_angle(local_sidereal_time - ra)
}

/// Project an equatorial direction onto the horizon of an observer at
/// geodetic latitude `latitude` whose local sidereal time is `local_sidereal_time`
pub fn equatorial_to_horizontal(
    position: &Equatorial,
    distance: f64,
    latitude: f64,
    local_sidereal_time: f64,
    time: f64,
) -> HorizonSample {
    let h = hour_angle(local_sidereal_time, position.ra);
    let (sin_h, cos_h) = h.sin_cos();
    let (sin_dec, cos_dec) = position.dec.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();

    let sin_elevation = sin_lat * sin_dec + cos_lat * cos_dec * cos_h;
    let elevation = sin_elevation.clamp(-1.0, 1.0).asin();
    let azimuth = (-sin_h * cos_dec)
        .atan2(sin_dec * cos_lat - cos_dec * cos_h * sin_lat)
        .rem_euclid(TAU);

    HorizonSample {
        time,
        azimuth,
        elevation,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEG2RAD;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_transit_elevation() {
        // On the meridian the elevation is 90° − |φ − δ|
        let star = Equatorial::from_degrees(30.0, 10.0);
        let sample = equatorial_to_horizontal(&star, 0.0, 50.0 * DEG2RAD, star.ra, 0.0);
        assert_relative_eq!(sample.elevation, 50.0 * DEG2RAD, epsilon = 1e-12);
        assert_relative_eq!(sample.azimuth, PI, epsilon = 1e-12);
    }

    #[test]
    fn test_zenith_and_pole() {
        let latitude = 40.0 * DEG2RAD;
        let pole = Equatorial::new(0.0, PI / 2.0);
        let sample = equatorial_to_horizontal(&pole, 0.0, latitude, 1.234, 0.0);
        assert_relative_eq!(sample.elevation, latitude, epsilon = 1e-12);

        let overhead = Equatorial::new(2.0, latitude);
        let sample = equatorial_to_horizontal(&overhead, 0.0, latitude, 2.0, 0.0);
        assert_relative_eq!(sample.elevation, PI / 2.0, epsilon = 1e-7);
    }

    #[test]
    fn test_rising_object_is_in_the_east() {
        // Six hours before transit an equatorial object sits on the eastern horizon
        let star = Equatorial::new(PI, 0.0);
        let sample = equatorial_to_horizontal(&star, 0.0, 0.7, PI - PI / 2.0, 0.0);
        assert_relative_eq!(sample.elevation, 0.0, epsilon = 1e-12);
        assert_relative_eq!(sample.azimuth, PI / 2.0, epsilon = 1e-12);
    }
}
