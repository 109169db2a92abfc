use crate::constants::{OBLIQUITY_J2000, RAD2DEG, TAU};
use lazy_static::lazy_static;
use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

// Static transformation matrices

lazy_static! {
    // Rotation about the vernal equinox by the J2000 mean obliquity
    static ref EC_TO_EQ: Matrix3<f64> =
        *Rotation3::from_axis_angle(&Vector3::x_axis(), OBLIQUITY_J2000).matrix();
    static ref EQ_TO_EC: Matrix3<f64> = EC_TO_EQ.transpose();
}

/// Rotate an ecliptic J2000 vector into the equatorial J2000 frame
pub fn ecliptic_to_equatorial(v: &Vector3<f64>) -> Vector3<f64> {
    *EC_TO_EQ * v
}

/// Rotate an equatorial J2000 vector into the ecliptic J2000 frame
pub fn equatorial_to_ecliptic(v: &Vector3<f64>) -> Vector3<f64> {
    *EQ_TO_EC * v
}

fn unit_vector(lon: f64, lat: f64) -> Vector3<f64> {
    let cos_lat = lat.cos();
    Vector3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
}

fn spherical(v: &Vector3<f64>) -> (f64, f64) {
    let r_xy = (v.x * v.x + v.y * v.y).sqrt();
    (v.y.atan2(v.x), v.z.atan2(r_xy))
}

// Marker trait for inertial coordinate systems
pub trait InertialFrame: Sized {
    fn to_unit_vector(&self) -> Vector3<f64>;
    fn from_vector(v: &Vector3<f64>) -> Self;
}

/// Equatorial J2000 coordinates (RA/Dec)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    /// Right ascension in radians, [0, 2π)
    pub ra: f64,
    /// Declination in radians
    pub dec: f64,
}

impl Equatorial {
    pub fn new(ra: f64, dec: f64) -> Self {
        Equatorial {
            ra: ra.rem_euclid(TAU),
            dec,
        }
    }

    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(ra_deg.to_radians(), dec_deg.to_radians())
    }

    /// Right ascension in hours
    pub fn ra_hours(&self) -> f64 {
        self.ra * RAD2DEG / 15.0
    }

    pub fn dec_degrees(&self) -> f64 {
        self.dec * RAD2DEG
    }
}

impl InertialFrame for Equatorial {
    fn to_unit_vector(&self) -> Vector3<f64> {
        unit_vector(self.ra, self.dec)
    }

    fn from_vector(v: &Vector3<f64>) -> Self {
        let (ra, dec) = spherical(v);
        Equatorial::new(ra, dec)
    }
}

/// Ecliptic J2000 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ecliptic {
    /// Ecliptic longitude in radians, [0, 2π)
    pub lon: f64,
    /// Ecliptic latitude in radians
    pub lat: f64,
}

impl Ecliptic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Ecliptic {
            lon: lon.rem_euclid(TAU),
            lat,
        }
    }

    /// Cartesian vector of length `distance` along this direction
    pub fn to_vector(&self, distance: f64) -> Vector3<f64> {
        self.to_unit_vector() * distance
    }

    pub fn lon_degrees(&self) -> f64 {
        self.lon * RAD2DEG
    }

    pub fn lat_degrees(&self) -> f64 {
        self.lat * RAD2DEG
    }
}

impl InertialFrame for Ecliptic {
    fn to_unit_vector(&self) -> Vector3<f64> {
        unit_vector(self.lon, self.lat)
    }

    fn from_vector(v: &Vector3<f64>) -> Self {
        let (lon, lat) = spherical(v);
        Ecliptic::new(lon, lat)
    }
}

impl From<Ecliptic> for Equatorial {
    fn from(ec: Ecliptic) -> Self {
        Equatorial::from_vector(&ecliptic_to_equatorial(&ec.to_unit_vector()))
    }
}

impl From<Equatorial> for Ecliptic {
    fn from(eq: Equatorial) -> Self {
        Ecliptic::from_vector(&equatorial_to_ecliptic(&eq.to_unit_vector()))
    }
}
