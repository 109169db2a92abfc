//! Fixed two-body element sets for comets, asteroids and planets

use super::{AnomalyError, Result};
use crate::constants::{GAUSS_K, TAU};
use serde::{Deserialize, Serialize};

/// Eccentricities within this distance of 1 count as an exact parabola
pub const PARABOLIC_TOLERANCE: f64 = 1e-9;

/// Conic section traced by an orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbitShape {
    Elliptic,
    Parabolic,
    Hyperbolic,
}

/// Heliocentric osculating elements, reused for every requested time
///
/// Angles are radians, distances astronomical units and times Julian dates.
/// For parabolic and hyperbolic orbits `epoch` is the time of perihelion
/// passage unless a mean anomaly at epoch is carried as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitElements {
    /// Time at which the mean anomaly equals `mean_anomaly_at_epoch`
    pub epoch: f64,
    /// Semi-major axis (elliptic orbits only, zero otherwise)
    #[serde(default)]
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    /// Perihelion distance q
    pub periapsis_distance: f64,
    pub inclination: f64,
    /// Argument of perihelion ω
    pub arg_periapsis: f64,
    /// Longitude of the ascending node Ω
    pub ascending_node_longitude: f64,
    /// Mean motion in rad/day
    #[serde(default)]
    pub mean_motion: f64,
    /// Mean anomaly at `epoch`
    #[serde(default)]
    pub mean_anomaly_at_epoch: f64,
    pub shape: OrbitShape,
}

/// Perihelion distance of an ellipse with semi-major axis `a` and eccentricity `e`
pub fn axis_to_peri(a: f64, e: f64) -> f64 {
    a * (1.0 - e)
}

/// Mean motion in rad/day of a heliocentric orbit with semi-major axis `a` in au
pub fn axis_to_mdot(a: f64) -> f64 {
    GAUSS_K / a.powf(1.5)
}

impl OrbitElements {
    /// Elliptic elements from the semi-major axis and the mean anomaly at `epoch`
    pub fn elliptic(
        epoch: f64,
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        arg_periapsis: f64,
        ascending_node_longitude: f64,
        mean_anomaly_at_epoch: f64,
    ) -> Result<Self> {
        let elements = Self {
            epoch,
            semi_major_axis,
            eccentricity,
            periapsis_distance: axis_to_peri(semi_major_axis, eccentricity),
            inclination,
            arg_periapsis,
            ascending_node_longitude,
            mean_motion: axis_to_mdot(semi_major_axis),
            mean_anomaly_at_epoch,
            shape: OrbitShape::Elliptic,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Parabolic elements; `perihelion_time` becomes the epoch
    pub fn parabolic(
        perihelion_time: f64,
        periapsis_distance: f64,
        inclination: f64,
        arg_periapsis: f64,
        ascending_node_longitude: f64,
    ) -> Result<Self> {
        let elements = Self {
            epoch: perihelion_time,
            semi_major_axis: 0.0,
            eccentricity: 1.0,
            periapsis_distance,
            inclination,
            arg_periapsis,
            ascending_node_longitude,
            mean_motion: 0.0,
            mean_anomaly_at_epoch: 0.0,
            shape: OrbitShape::Parabolic,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Hyperbolic elements; `perihelion_time` becomes the epoch
    pub fn hyperbolic(
        perihelion_time: f64,
        periapsis_distance: f64,
        eccentricity: f64,
        inclination: f64,
        arg_periapsis: f64,
        ascending_node_longitude: f64,
    ) -> Result<Self> {
        let elements = Self {
            epoch: perihelion_time,
            semi_major_axis: 0.0,
            eccentricity,
            periapsis_distance,
            inclination,
            arg_periapsis,
            ascending_node_longitude,
            mean_motion: 0.0,
            mean_anomaly_at_epoch: 0.0,
            shape: OrbitShape::Hyperbolic,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Attach a mean anomaly and mean motion, as carried by hyperbolic
    /// solutions derived from an elliptic fit
    pub fn with_mean_anomaly(mut self, mean_anomaly_at_epoch: f64, mean_motion: f64) -> Self {
        self.mean_anomaly_at_epoch = mean_anomaly_at_epoch;
        self.mean_motion = mean_motion;
        self
    }

    /// Check the shape invariants; element sets loaded from files should pass
    /// through here before reaching the solver.
    pub fn validate(&self) -> Result<()> {
        let e = self.eccentricity;
        let q = self.periapsis_distance;
        if !(q > 0.0 && q.is_finite()) {
            return Err(AnomalyError::InvalidElements(format!(
                "perihelion distance must be positive, got {q}"
            )));
        }
        match self.shape {
            OrbitShape::Elliptic => {
                if !(0.0..1.0).contains(&e) {
                    return Err(AnomalyError::InvalidElements(format!(
                        "elliptic orbit needs 0 <= e < 1, got {e}"
                    )));
                }
                let expected = q / (1.0 - e);
                if (self.semi_major_axis - expected).abs() > 1e-9 * expected.max(1.0) {
                    return Err(AnomalyError::InvalidElements(format!(
                        "semi-major axis {} disagrees with q/(1-e) = {expected}",
                        self.semi_major_axis
                    )));
                }
                if !(self.mean_motion > 0.0 && self.mean_motion.is_finite()) {
                    return Err(AnomalyError::InvalidElements(format!(
                        "elliptic orbit needs a positive mean motion, got {}",
                        self.mean_motion
                    )));
                }
            }
            OrbitShape::Parabolic => {
                if e != 1.0 {
                    return Err(AnomalyError::InvalidElements(format!(
                        "parabolic orbit needs e = 1, got {e}"
                    )));
                }
            }
            OrbitShape::Hyperbolic => {
                if e < 1.0 - PARABOLIC_TOLERANCE {
                    return Err(AnomalyError::InvalidElements(format!(
                        "hyperbolic orbit needs e >= 1, got {e}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Orbital period in days, for elliptic orbits
    pub fn period(&self) -> Option<f64> {
        match self.shape {
            OrbitShape::Elliptic if self.mean_motion > 0.0 => Some(TAU / self.mean_motion),
            _ => None,
        }
    }
}
