//! Planetary ephemeris calculations module
//!
//! Low-precision positions good enough for rise and set times:
//!
//! - Planets and the Earth-Moon barycenter from the JPL approximate mean
//!   elements (Standish, valid 1800-2050), evaluated through the anomaly solver.
//! - The Sun and Moon from the Astronomical Almanac low-precision series,
//!   precessed back to the J2000 ecliptic.
//!
//! All vectors are ecliptic J2000 in au.

use crate::constants::{AU_KM, C_AUDAY, DAY_S, DEG2RAD, EARTH_RADIUS_KM, J2000, JULIAN_CENTURY};
use crate::framelib::Ecliptic;
use crate::orbit::{self, normalize_angle, AnomalyError, OrbitElements};
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for planetary calculations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanetError {
    #[error("Planet not found: {0}")]
    NotFound(String),

    #[error("No geocentric position for {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Orbit(#[from] AnomalyError),
}

/// Result type for planetary calculations
pub type Result<T> = std::result::Result<T, PlanetError>;

/// General precession in ecliptic longitude, degrees per Julian century
const PRECESSION_DEG_PER_CENTURY: f64 = 1.396_971;

/// Enum representing the major solar system bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    pub const ALL: [Body; 11] = [
        Body::Sun,
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Moon,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Moon => "Moon",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }

    /// Mean-element table entry, for bodies that move on a heliocentric orbit
    pub fn mean_elements(&self) -> Option<&'static MeanElements> {
        let entry = match self {
            Body::Mercury => &MERCURY,
            Body::Venus => &VENUS,
            Body::Earth => &EM_BARYCENTER,
            Body::Mars => &MARS,
            Body::Jupiter => &JUPITER,
            Body::Saturn => &SATURN,
            Body::Uranus => &URANUS,
            Body::Neptune => &NEPTUNE,
            Body::Pluto => &PLUTO,
            Body::Sun | Body::Moon => return None,
        };
        Some(entry)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = PlanetError;

    fn from_str(s: &str) -> Result<Self> {
        Body::ALL
            .into_iter()
            .find(|body| body.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlanetError::NotFound(s.to_string()))
    }
}

/// Keplerian elements at J2000 and their rates per Julian century
///
/// Angles are degrees; `a` is au.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    pub a: [f64; 2],
    pub e: [f64; 2],
    pub inclination: [f64; 2],
    pub mean_longitude: [f64; 2],
    pub perihelion_longitude: [f64; 2],
    pub node_longitude: [f64; 2],
}

const MERCURY: MeanElements = MeanElements {
    a: [0.387_099_27, 0.000_000_37],
    e: [0.205_635_93, 0.000_019_06],
    inclination: [7.004_979_02, -0.005_947_49],
    mean_longitude: [252.250_323_50, 149_472.674_111_75],
    perihelion_longitude: [77.457_796_28, 0.160_476_89],
    node_longitude: [48.330_765_93, -0.125_340_81],
};

const VENUS: MeanElements = MeanElements {
    a: [0.723_335_66, 0.000_003_90],
    e: [0.006_776_72, -0.000_041_07],
    inclination: [3.394_676_05, -0.000_788_90],
    mean_longitude: [181.979_099_50, 58_517.815_387_29],
    perihelion_longitude: [131.602_467_18, 0.002_683_29],
    node_longitude: [76.679_842_55, -0.277_694_18],
};

const EM_BARYCENTER: MeanElements = MeanElements {
    a: [1.000_002_61, 0.000_005_62],
    e: [0.016_711_23, -0.000_043_92],
    inclination: [-0.000_015_31, -0.012_946_68],
    mean_longitude: [100.464_571_66, 35_999.372_449_81],
    perihelion_longitude: [102.937_681_93, 0.323_273_64],
    node_longitude: [0.0, 0.0],
};

const MARS: MeanElements = MeanElements {
    a: [1.523_710_34, 0.000_018_47],
    e: [0.093_394_10, 0.000_078_82],
    inclination: [1.849_691_42, -0.008_131_31],
    mean_longitude: [-4.553_432_05, 19_140.302_684_99],
    perihelion_longitude: [-23.943_629_59, 0.444_410_88],
    node_longitude: [49.559_538_91, -0.292_573_43],
};

const JUPITER: MeanElements = MeanElements {
    a: [5.202_887_00, -0.000_116_07],
    e: [0.048_386_24, -0.000_132_53],
    inclination: [1.304_396_95, -0.001_837_14],
    mean_longitude: [34.396_440_51, 3_034.746_127_75],
    perihelion_longitude: [14.728_479_83, 0.212_526_68],
    node_longitude: [100.473_909_09, 0.204_691_06],
};

const SATURN: MeanElements = MeanElements {
    a: [9.536_675_94, -0.001_250_60],
    e: [0.053_861_79, -0.000_509_91],
    inclination: [2.485_991_87, 0.001_936_09],
    mean_longitude: [49.954_244_23, 1_222.493_622_01],
    perihelion_longitude: [92.598_878_31, -0.418_972_16],
    node_longitude: [113.662_424_48, -0.288_677_94],
};

const URANUS: MeanElements = MeanElements {
    a: [19.189_164_64, -0.001_961_76],
    e: [0.047_257_44, -0.000_043_97],
    inclination: [0.772_637_83, -0.002_429_39],
    mean_longitude: [313.238_104_51, 428.482_027_85],
    perihelion_longitude: [170.954_276_30, 0.408_052_81],
    node_longitude: [74.016_925_03, 0.042_405_89],
};

const NEPTUNE: MeanElements = MeanElements {
    a: [30.069_922_76, 0.000_262_91],
    e: [0.008_590_48, 0.000_051_05],
    inclination: [1.770_043_47, 0.000_353_72],
    mean_longitude: [-55.120_029_69, 218.459_453_25],
    perihelion_longitude: [44.964_762_27, -0.322_414_64],
    node_longitude: [131.784_225_74, -0.005_086_64],
};

const PLUTO: MeanElements = MeanElements {
    a: [39.482_116_75, -0.000_315_96],
    e: [0.248_827_30, 0.000_051_70],
    inclination: [17.140_012_06, 0.000_048_18],
    mean_longitude: [238.929_038_33, 145.207_805_15],
    perihelion_longitude: [224.068_916_29, -0.040_629_42],
    node_longitude: [110.303_936_84, -0.011_834_82],
};

impl MeanElements {
    /// Osculating elements with epoch `jd`
    pub fn elements_at(&self, jd: f64) -> orbit::Result<OrbitElements> {
        let t = (jd - J2000) / JULIAN_CENTURY;
        let at = |pair: [f64; 2]| pair[0] + pair[1] * t;

        let perihelion_longitude = at(self.perihelion_longitude) * DEG2RAD;
        let node = at(self.node_longitude) * DEG2RAD;
        let mean_anomaly =
            normalize_angle(at(self.mean_longitude) * DEG2RAD - perihelion_longitude);

        OrbitElements::elliptic(
            jd,
            at(self.a),
            at(self.e),
            at(self.inclination) * DEG2RAD,
            perihelion_longitude - node,
            node,
            mean_anomaly,
        )
    }
}

fn precessed_to_j2000(longitude_of_date: f64, t: f64) -> f64 {
    longitude_of_date - PRECESSION_DEG_PER_CENTURY * t
}

/// Geocentric position of the Sun (about 0.01°)
pub fn sun_geocentric(jd: f64) -> Vector3<f64> {
    let n = jd - J2000;
    let t = n / JULIAN_CENTURY;
    let mean_longitude = 280.460 + 0.985_647_4 * n;
    let g = (357.528 + 0.985_600_3 * n) * DEG2RAD;

    let longitude = mean_longitude + 1.915 * g.sin() + 0.020 * (2.0 * g).sin();
    let distance = 1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos();

    Ecliptic::new(precessed_to_j2000(longitude, t) * DEG2RAD, 0.0).to_vector(distance)
}

/// Geocentric position of the Moon (about 0.3° in direction)
pub fn moon_geocentric(jd: f64) -> Vector3<f64> {
    let t = (jd - J2000) / JULIAN_CENTURY;
    let sin = |deg: f64| (deg * DEG2RAD).sin();
    let cos = |deg: f64| (deg * DEG2RAD).cos();

    let longitude = 218.32 + 481_267.881 * t + 6.29 * sin(135.0 + 477_198.87 * t)
        - 1.27 * sin(259.3 - 413_335.36 * t)
        + 0.66 * sin(235.7 + 890_534.22 * t)
        + 0.21 * sin(269.9 + 954_397.74 * t)
        - 0.19 * sin(357.5 + 35_999.05 * t)
        - 0.11 * sin(186.5 + 966_404.03 * t);
    let latitude = 5.13 * sin(93.3 + 483_202.02 * t) + 0.28 * sin(228.2 + 960_400.89 * t)
        - 0.28 * sin(318.3 + 6_003.15 * t)
        - 0.17 * sin(217.6 - 407_332.21 * t);
    let parallax = 0.9508
        + 0.0518 * cos(135.0 + 477_198.87 * t)
        + 0.0095 * cos(259.3 - 413_335.36 * t)
        + 0.0078 * cos(235.7 + 890_534.22 * t)
        + 0.0028 * cos(269.9 + 954_397.74 * t);

    let distance = EARTH_RADIUS_KM / (parallax * DEG2RAD).sin() / AU_KM;
    Ecliptic::new(precessed_to_j2000(longitude, t) * DEG2RAD, latitude * DEG2RAD)
        .to_vector(distance)
}

/// Heliocentric position of the Earth, taken as the Earth-Moon barycenter
pub fn earth_heliocentric(jd: f64) -> orbit::Result<Vector3<f64>> {
    let elements = EM_BARYCENTER.elements_at(jd)?;
    orbit::heliocentric_position(&elements, jd)
}

/// Heliocentric position of any body
pub fn heliocentric_position(body: Body, jd: f64) -> Result<Vector3<f64>> {
    match body {
        Body::Sun => Ok(Vector3::zeros()),
        Body::Moon => Ok(earth_heliocentric(jd)? + moon_geocentric(jd)),
        _ => match body.mean_elements() {
            Some(table) => {
                let elements = table.elements_at(jd)?;
                Ok(orbit::heliocentric_position(&elements, jd)?)
            }
            None => Err(PlanetError::NotFound(body.name().to_string())),
        },
    }
}

/// Position of a source as seen from `observer`, corrected once for light time
///
/// The source is evaluated at `jd`, the light time derived from that
/// distance, and the source evaluated again at `jd` minus the light time.
/// The correction is not iterated.
pub fn light_time_corrected<F, E>(
    jd: f64,
    observer: &Vector3<f64>,
    source: F,
) -> std::result::Result<Vector3<f64>, E>
where
    F: Fn(f64) -> std::result::Result<Vector3<f64>, E>,
{
    let first = source(jd)? - observer;
    let light_time = first.norm() / C_AUDAY;
    trace!("light time {:.3} s", light_time * DAY_S);
    Ok(source(jd - light_time)? - observer)
}

/// Geocentric ecliptic J2000 position in au
pub fn geocentric_position(body: Body, jd: f64) -> Result<Vector3<f64>> {
    match body {
        Body::Sun => Ok(sun_geocentric(jd)),
        Body::Moon => Ok(moon_geocentric(jd)),
        Body::Earth => Err(PlanetError::Unsupported(body.name())),
        _ => {
            let earth = earth_heliocentric(jd)?;
            light_time_corrected(jd, &earth, |t| heliocentric_position(body, t))
        }
    }
}
