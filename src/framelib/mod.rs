//! Reference frames
//!
//! Only the J2000 mean equator and ecliptic are modelled; precession and
//! nutation are ignored.

pub mod horizontal;
pub mod inertial;

pub use horizontal::{equatorial_to_horizontal, hour_angle, HorizonSample};
pub use inertial::{
    ecliptic_to_equatorial, equatorial_to_ecliptic, Ecliptic, Equatorial, InertialFrame,
};
