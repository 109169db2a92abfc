//! Heliocentric two-body orbits
//!
//! [`elements`] holds the fixed element sets, [`anomaly`] solves them for
//! the true anomaly and distance at a given time, and
//! [`heliocentric_position`] turns that into an ecliptic J2000 vector.

pub mod anomaly;
pub mod elements;

use nalgebra::Vector3;
use thiserror::Error;

pub use anomaly::{normalize_angle, solve, uses_universal_variable, AnomalyResult};
pub use elements::{axis_to_mdot, axis_to_peri, OrbitElements, OrbitShape};

/// Error type for the anomaly solver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnomalyError {
    #[error("{method} iteration did not converge within {iterations} steps")]
    NoConvergence {
        method: &'static str,
        iterations: usize,
    },

    #[error("Universal-variable series failed to converge after {terms} terms")]
    NoSeriesConvergence { terms: usize },

    #[error("Mean anomaly {mean_anomaly} cannot be converted with mean motion {mean_motion}")]
    InvalidMeanMotion { mean_anomaly: f64, mean_motion: f64 },

    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),
}

/// Result type for orbit operations
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Rotate a point in the orbital plane into the ecliptic frame
///
/// `u` is the argument of latitude ω + ν.
fn orbital_plane_to_ecliptic(elements: &OrbitElements, distance: f64, u: f64) -> Vector3<f64> {
    let (sin_node, cos_node) = elements.ascending_node_longitude.sin_cos();
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_i, cos_i) = elements.inclination.sin_cos();

    Vector3::new(
        distance * (cos_node * cos_u - sin_node * sin_u * cos_i),
        distance * (sin_node * cos_u + cos_node * sin_u * cos_i),
        distance * sin_u * sin_i,
    )
}

/// Heliocentric ecliptic J2000 position in au at Julian date `time`
pub fn heliocentric_position(elements: &OrbitElements, time: f64) -> Result<Vector3<f64>> {
    let AnomalyResult {
        true_anomaly,
        distance,
    } = solve(elements, time)?;
    Ok(orbital_plane_to_ecliptic(
        elements,
        distance,
        elements.arg_periapsis + true_anomaly,
    ))
}
