//! Celestial body definitions and calculations
//!
//! Every kind of object the almanac can follow is reduced to one question:
//! where does it sit on the geocentric J2000 sky at a given Julian date?

use crate::framelib::{Ecliptic, Equatorial, InertialFrame};
use crate::orbit::{self, OrbitElements};
use crate::planetlib::{self, Body, PlanetError};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Geocentric direction and distance of an object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Astrometric {
    pub position: Equatorial,
    /// au; zero for objects at infinity
    pub distance: f64,
}

impl Astrometric {
    /// From an ecliptic J2000 geocentric vector in au
    pub fn from_ecliptic(v: &Vector3<f64>) -> Self {
        Self {
            position: Ecliptic::from_vector(v).into(),
            distance: v.norm(),
        }
    }

    /// Direction in ecliptic J2000 longitude and latitude
    pub fn ecliptic(&self) -> Ecliptic {
        self.position.into()
    }
}

/// A trait for objects that have a position in the sky
pub trait PositionModel {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Geocentric position at Julian date `jd`
    fn astrometric(&self, jd: f64) -> Result<Astrometric, PlanetError>;
}

/// A star or any other direction fixed on the J2000 sky
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedStar {
    pub name: String,
    pub position: Equatorial,
}

impl FixedStar {
    pub fn new(name: &str, position: Equatorial) -> Self {
        Self {
            name: name.to_string(),
            position,
        }
    }
}

impl PositionModel for FixedStar {
    fn name(&self) -> &str {
        &self.name
    }

    fn astrometric(&self, _jd: f64) -> Result<Astrometric, PlanetError> {
        Ok(Astrometric {
            position: self.position,
            distance: 0.0,
        })
    }
}

/// The Sun, the Moon or a major planet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarSystemBody {
    pub body: Body,
}

impl SolarSystemBody {
    /// Fails for the Earth, which has no geocentric position
    pub fn new(body: Body) -> Result<Self, PlanetError> {
        if body == Body::Earth {
            return Err(PlanetError::Unsupported(body.name()));
        }
        Ok(Self { body })
    }
}

impl PositionModel for SolarSystemBody {
    fn name(&self) -> &str {
        self.body.name()
    }

    fn astrometric(&self, jd: f64) -> Result<Astrometric, PlanetError> {
        let v = planetlib::geocentric_position(self.body, jd)?;
        Ok(Astrometric::from_ecliptic(&v))
    }
}

/// A comet or asteroid on a fixed heliocentric orbit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinorBody {
    pub name: String,
    #[serde(flatten)]
    pub elements: OrbitElements,
}

impl MinorBody {
    pub fn new(name: &str, elements: OrbitElements) -> Self {
        Self {
            name: name.to_string(),
            elements,
        }
    }

    /// Geocentric ecliptic J2000 position, corrected once for light time
    pub fn geocentric_position(&self, jd: f64) -> Result<Vector3<f64>, PlanetError> {
        let earth = planetlib::earth_heliocentric(jd)?;
        let v = planetlib::light_time_corrected(jd, &earth, |t| {
            orbit::heliocentric_position(&self.elements, t)
        })?;
        Ok(v)
    }
}

impl PositionModel for MinorBody {
    fn name(&self) -> &str {
        &self.name
    }

    fn astrometric(&self, jd: f64) -> Result<Astrometric, PlanetError> {
        Ok(Astrometric::from_ecliptic(&self.geocentric_position(jd)?))
    }
}

impl<M: PositionModel + ?Sized> PositionModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn astrometric(&self, jd: f64) -> Result<Astrometric, PlanetError> {
        (**self).astrometric(jd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEG2RAD, J2000};
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_star_does_not_move() {
        let vega = FixedStar::new("Vega", Equatorial::from_degrees(279.2347, 38.7837));
        let a = vega.astrometric(J2000).unwrap();
        let b = vega.astrometric(J2000 + 1000.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.distance, 0.0);
    }

    #[test]
    fn test_earth_is_rejected() {
        assert!(SolarSystemBody::new(Body::Earth).is_err());
        assert!(SolarSystemBody::new(Body::Moon).is_ok());
    }

    #[test]
    fn test_sun_on_the_ecliptic() {
        // Near the June solstice the Sun is close to RA 6h, Dec +23.4°
        let sun = SolarSystemBody::new(Body::Sun).unwrap();
        let pos = sun.astrometric(2_451_716.5).unwrap();
        assert_relative_eq!(pos.position.ra_hours(), 6.0, epsilon = 0.1);
        assert_relative_eq!(pos.position.dec, 23.44 * DEG2RAD, epsilon = 0.01);
    }

    #[test]
    fn test_ecliptic_direction_survives_equatorial_storage() {
        let jd = 2_451_716.5;
        let direct = Ecliptic::from_vector(&planetlib::sun_geocentric(jd));
        let pos = SolarSystemBody::new(Body::Sun).unwrap().astrometric(jd).unwrap();
        let ecliptic = pos.ecliptic();
        assert_relative_eq!(ecliptic.lon, direct.lon, epsilon = 1e-12);
        assert_relative_eq!(ecliptic.lat, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ecliptic.lon_degrees(), 90.0, epsilon = 0.1);
    }

    #[test]
    fn test_minor_body_on_earth_orbit_copy() {
        // A body sharing the Earth's orbit but half a revolution ahead sits
        // about 2 au away
        let earth = planetlib::Body::Earth
            .mean_elements()
            .unwrap()
            .elements_at(J2000)
            .unwrap();
        let mut opposite = earth.clone();
        opposite.mean_anomaly_at_epoch += std::f64::consts::PI;
        let body = MinorBody::new("Counter-Earth", opposite);
        let pos = body.astrometric(J2000).unwrap();
        assert_relative_eq!(pos.distance, 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_minor_body_from_json() {
        let json = r#"{
            "name": "Test comet",
            "epoch": 2460000.5,
            "eccentricity": 1.0,
            "periapsis_distance": 0.5,
            "inclination": 0.3,
            "arg_periapsis": 2.0,
            "ascending_node_longitude": 3.0,
            "shape": "parabolic"
        }"#;
        let body: MinorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.name(), "Test comet");
        assert!(body.astrometric(2_460_010.5).unwrap().distance > 0.0);
    }
}
