//! Two-body anomaly solver
//!
//! Turns a fixed set of [`OrbitElements`] and a time into the body's true
//! anomaly and heliocentric distance. Three iterations cover the conic
//! sections:
//!
//! - **Elliptic**: Newton iteration on Kepler's equation `M = E - e sin E`.
//! - **Parabolic**: Newton iteration on Barker's equation `s³ + 3s = W`.
//! - **Near-parabolic / hyperbolic**: Landgraf's universal-variable method
//!   (Meeus, *Astronomical Algorithms*, ch. 35), a power series in `s²`
//!   nested inside a cubic fixed point.
//!
//! Highly eccentric ellipses observed close to perihelion make Kepler's
//! equation ill-conditioned, so those are routed to the universal-variable
//! method as well; see [`uses_universal_variable`].
//!
//! Every iteration is capped. Exhausting a cap is an error, never a
//! silently truncated result.

use super::elements::{OrbitElements, OrbitShape, PARABOLIC_TOLERANCE};
use super::{AnomalyError, Result};
use crate::constants::{BARKER_C, GAUSS_K, TAU};
use log::trace;
use std::f64::consts::PI;

/// Convergence threshold shared by every iteration (radians or units of `s`)
pub const TOLERANCE: f64 = 1e-9;
/// Step budget for the Kepler and Barker iterations
pub const MAX_ITERATIONS: usize = 100;
/// Step budget for the outer universal-variable loop
pub const MAX_UNIVERSAL_ITERATIONS: usize = 50;
/// Maximum number of terms summed in the universal-variable series
pub const MAX_SERIES_TERMS: usize = 50;
/// A series term larger than this means the series is diverging
pub const SERIES_DIVERGENCE: f64 = 1e4;

/// Ellipses more eccentric than this are candidates for the universal-variable path
pub const ESCAPE_ECCENTRICITY: f64 = 0.975;
/// ... when their mean anomaly is smaller than this
pub const ESCAPE_MEAN_ANOMALY: f64 = 0.5;

/// Times since perihelion below this (days) are treated as the perihelion itself
const PERIAPSIS_EPSILON: f64 = 1e-9;
const NEGLIGIBLE_MEAN_ANOMALY: f64 = 1e-15;
const NEGLIGIBLE_MEAN_MOTION: f64 = 1e-15;

/// Position of a body along its orbit at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyResult {
    /// Angle from perihelion, radians in (−π, π]
    pub true_anomaly: f64,
    /// Heliocentric distance in au
    pub distance: f64,
}

impl AnomalyResult {
    fn at_periapsis(periapsis_distance: f64) -> Self {
        Self {
            true_anomaly: 0.0,
            distance: periapsis_distance,
        }
    }
}

/// Reduce an angle to (−π, π]
///
/// Angles already inside the interval are returned untouched, so tiny
/// mean anomalies keep their full relative precision.
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let reduced = (angle + PI).rem_euclid(TAU) - PI;
    if reduced <= -PI {
        PI
    } else {
        reduced
    }
}

/// Whether an ellipse at mean anomaly `mean_anomaly` is too close to
/// parabolic for Kepler's equation and should use the universal variable
pub fn uses_universal_variable(eccentricity: f64, mean_anomaly: f64) -> bool {
    eccentricity > ESCAPE_ECCENTRICITY && mean_anomaly.abs() < ESCAPE_MEAN_ANOMALY
}

/// True anomaly and heliocentric distance of `elements` at Julian date `time`
pub fn solve(elements: &OrbitElements, time: f64) -> Result<AnomalyResult> {
    match elements.shape {
        OrbitShape::Elliptic => solve_elliptic(elements, time),
        OrbitShape::Parabolic => solve_parabolic(elements, time),
        OrbitShape::Hyperbolic => {
            let tau = time - elements.epoch
                + periapsis_offset(elements.mean_anomaly_at_epoch, elements.mean_motion)?;
            solve_universal(elements.periapsis_distance, elements.eccentricity, tau)
        }
    }
}

/// Time from the nearest perihelion passage to the instant where the mean
/// anomaly equals `mean_anomaly`
fn periapsis_offset(mean_anomaly: f64, mean_motion: f64) -> Result<f64> {
    if mean_anomaly.abs() < NEGLIGIBLE_MEAN_ANOMALY {
        return Ok(0.0);
    }
    if mean_motion.abs() < NEGLIGIBLE_MEAN_MOTION {
        return Err(AnomalyError::InvalidMeanMotion {
            mean_anomaly,
            mean_motion,
        });
    }
    Ok(mean_anomaly / mean_motion)
}

fn solve_elliptic(elements: &OrbitElements, time: f64) -> Result<AnomalyResult> {
    let e = elements.eccentricity;
    let tau = time - elements.epoch;
    let mean_anomaly =
        normalize_angle(elements.mean_anomaly_at_epoch + elements.mean_motion * tau);

    if uses_universal_variable(e, mean_anomaly) {
        trace!(
            "e = {e}, M = {mean_anomaly}: switching to the universal variable near perihelion"
        );
        let tau = periapsis_offset(mean_anomaly, elements.mean_motion)?;
        return solve_universal(elements.periapsis_distance, e, tau);
    }

    let eccentric_anomaly = solve_kepler(mean_anomaly, e)?;
    let true_anomaly =
        2.0 * (((1.0 + e) / (1.0 - e)).sqrt() * (eccentric_anomaly / 2.0).tan()).atan();
    let distance = elements.semi_major_axis * (1.0 - e * eccentric_anomaly.cos());

    Ok(AnomalyResult {
        true_anomaly,
        distance,
    })
}

/// Eccentric anomaly in (−π, π] for a mean anomaly and eccentricity `e < 1`
pub fn solve_kepler(mean_anomaly: f64, e: f64) -> Result<f64> {
    let mut ecc_anomaly = mean_anomaly;
    for _ in 0..MAX_ITERATIONS {
        let next = ecc_anomaly
            + (mean_anomaly + e * ecc_anomaly.sin() - ecc_anomaly)
                / (1.0 - e * ecc_anomaly.cos());
        if (next - ecc_anomaly).abs() < TOLERANCE {
            return Ok(normalize_angle(next));
        }
        ecc_anomaly = next;
    }
    Err(AnomalyError::NoConvergence {
        method: "Kepler",
        iterations: MAX_ITERATIONS,
    })
}

fn solve_parabolic(elements: &OrbitElements, time: f64) -> Result<AnomalyResult> {
    let q = elements.periapsis_distance;
    let w = BARKER_C * (time - elements.epoch) / q.powf(1.5);
    let s = solve_barker(w)?;

    Ok(AnomalyResult {
        true_anomaly: 2.0 * s.atan(),
        distance: q * (1.0 + s * s),
    })
}

/// Root `s = tan(ν/2)` of Barker's equation `s³ + 3s = w`
pub fn solve_barker(w: f64) -> Result<f64> {
    let mut s = 0.0_f64;
    for _ in 0..MAX_ITERATIONS {
        let next = (2.0 * s.powi(3) + w) / (3.0 * (s * s + 1.0));
        if (next - s).abs() < TOLERANCE {
            return Ok(next);
        }
        s = next;
    }
    Err(AnomalyError::NoConvergence {
        method: "Barker",
        iterations: MAX_ITERATIONS,
    })
}

/// Universal-variable solution `tau` days after perihelion passage
fn solve_universal(q: f64, e: f64, tau: f64) -> Result<AnomalyResult> {
    if tau.abs() < PERIAPSIS_EPSILON {
        return Ok(AnomalyResult::at_periapsis(q));
    }

    let q1 = GAUSS_K * ((1.0 + e) / q).sqrt() / (2.0 * q);
    let q2 = q1 * tau;
    let mut s = parabolic_guess(q2);

    // γ vanishes for an exact parabola and the leading-order root is exact
    if (1.0 - e).abs() >= PARABOLIC_TOLERANCE {
        let gamma = (1.0 - e) / (1.0 + e);
        let mut converged = false;
        for iteration in 1..=MAX_UNIVERSAL_ITERATIONS {
            let previous = s;
            let q3 = universal_series(s, gamma, q2)?;
            s = refine_cubic(s, q3)?;
            if (s - previous).abs() < TOLERANCE {
                trace!("universal variable converged after {iteration} steps: s = {s}");
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(AnomalyError::NoConvergence {
                method: "universal-variable",
                iterations: MAX_UNIVERSAL_ITERATIONS,
            });
        }
    }

    let true_anomaly = 2.0 * s.atan();
    let distance = q * (1.0 + e) / (1.0 + e * true_anomaly.cos());
    Ok(AnomalyResult {
        true_anomaly,
        distance,
    })
}

/// Closed-form root of `s³/3 + s = q2`, with the sign of `q2`
fn parabolic_guess(q2: f64) -> f64 {
    let g = 1.5 * q2.abs();
    let y = (g + (g * g + 1.0).sqrt()).cbrt();
    (y - 1.0 / y).copysign(q2)
}

/// Right-hand side `Q3` of the corrected cubic for the current `s`
fn universal_series(s: f64, gamma: f64, q2: f64) -> Result<f64> {
    let y = s * s;
    let mut term = -y * s;
    let mut q3 = q2 + 2.0 * gamma * s * y / 3.0;
    let mut z = 1.0;
    for terms in 1..=MAX_SERIES_TERMS {
        z += 1.0;
        term *= -gamma * y;
        let f = term * (z - (z + 1.0) * gamma) / (2.0 * z + 1.0);
        q3 += f;
        if f.abs() > SERIES_DIVERGENCE {
            return Err(AnomalyError::NoSeriesConvergence { terms });
        }
        if f.abs() < TOLERANCE {
            return Ok(q3);
        }
    }
    Err(AnomalyError::NoSeriesConvergence {
        terms: MAX_SERIES_TERMS,
    })
}

/// Newton iteration on `s³/3 + s = q3` starting from `s`
fn refine_cubic(mut s: f64, q3: f64) -> Result<f64> {
    for _ in 0..MAX_ITERATIONS {
        let next = (2.0 * s.powi(3) / 3.0 + q3) / (s * s + 1.0);
        if (next - s).abs() < TOLERANCE {
            return Ok(next);
        }
        s = next;
    }
    Err(AnomalyError::NoConvergence {
        method: "cubic refinement",
        iterations: MAX_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rstest::rstest;

    fn elliptic(q: f64, e: f64, m0: f64) -> OrbitElements {
        OrbitElements::elliptic(0.0, q / (1.0 - e), e, 0.0, 0.0, 0.0, m0).unwrap()
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(PI, PI)]
    #[case(-PI, PI)]
    #[case(3.0 * PI, PI)]
    #[case(TAU + 0.25, 0.25)]
    #[case(-TAU - 0.25, -0.25)]
    #[case(1e-20, 1e-20)]
    fn test_normalize_angle(#[case] angle: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(normalize_angle(angle), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_escape_hatch_predicate() {
        assert!(uses_universal_variable(0.98, 0.1));
        assert!(uses_universal_variable(0.98, -0.49));
        assert!(!uses_universal_variable(0.975, 0.1));
        assert!(!uses_universal_variable(0.98, 0.5));
        assert!(!uses_universal_variable(0.5, 0.0));
    }

    #[test]
    fn test_kepler_residual() {
        let e = 0.2056;
        let m = 1.5;
        let ecc = solve_kepler(m, e).unwrap();
        assert_abs_diff_eq!(ecc - e * ecc.sin(), m, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_orbit_is_uniform() {
        let el = elliptic(1.0, 0.0, 0.0);
        let quarter = el.period().unwrap() / 4.0;
        let result = solve(&el, quarter).unwrap();
        assert_relative_eq!(result.true_anomaly, PI / 2.0, epsilon = 1e-9);
        assert_relative_eq!(result.distance, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_barker_solves_cubic() {
        for w in [-50.0, -0.3, 0.0, 0.01, 2.0, 1e4] {
            let s = solve_barker(w).unwrap();
            assert_abs_diff_eq!(s.powi(3) + 3.0 * s, w, epsilon = 1e-6 * w.abs().max(1.0));
        }
    }

    #[test]
    fn test_parabolic_guess_solves_cubic() {
        for q2 in [-3.0, -1e-3, 1e-6, 0.5, 40.0] {
            let s = parabolic_guess(q2);
            assert_relative_eq!(s.powi(3) / 3.0 + s, q2, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_periapsis_for_every_shape() {
        let shapes = [
            elliptic(1.2, 0.5, 0.0),
            OrbitElements::parabolic(100.0, 0.8, 0.1, 0.2, 0.3).unwrap(),
            OrbitElements::hyperbolic(100.0, 0.8, 1.3, 0.1, 0.2, 0.3).unwrap(),
        ];
        for el in shapes {
            let result = solve(&el, el.epoch).unwrap();
            assert_abs_diff_eq!(result.true_anomaly, 0.0, epsilon = 1e-12);
            assert_relative_eq!(result.distance, el.periapsis_distance, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_near_parabolic_matches_kepler() {
        // Just below the escape threshold the two elliptic paths must agree
        let q = 1.0;
        let e = 0.99;
        let el = elliptic(q, e, 0.0);
        let tau = 30.0;
        let universal = solve(&el, tau).unwrap();

        let mean_anomaly = el.mean_motion * tau;
        assert!(uses_universal_variable(e, mean_anomaly));
        let ecc = solve_kepler(mean_anomaly, e).unwrap();
        let nu = 2.0 * (((1.0 + e) / (1.0 - e)).sqrt() * (ecc / 2.0).tan()).atan();

        assert_abs_diff_eq!(universal.true_anomaly, nu, epsilon = 1e-9);
        assert_relative_eq!(
            universal.distance,
            el.semi_major_axis * (1.0 - e * ecc.cos()),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_hyperbolic_matches_hyperbolic_kepler() {
        let (q, e) = (2.0, 1.5);
        let el = OrbitElements::hyperbolic(0.0, q, e, 0.0, 0.0, 0.0).unwrap();
        let tau = -100.0;
        let result = solve(&el, tau).unwrap();

        // Independent check through e sinh H - H = n tau
        let a = q / (e - 1.0);
        let m = GAUSS_K / a.powf(1.5) * tau;
        let mut h = (m / e).asinh();
        for _ in 0..50 {
            h -= (e * h.sinh() - h - m) / (e * h.cosh() - 1.0);
        }
        let nu = 2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (h / 2.0).tanh()).atan();
        assert!(result.true_anomaly < 0.0);
        assert_abs_diff_eq!(result.true_anomaly, nu, epsilon = 1e-8);
        assert_relative_eq!(result.distance, a * (e * h.cosh() - 1.0), epsilon = 1e-8);
    }

    #[test]
    fn test_hyperbolic_mean_anomaly_offset() {
        // Carrying M0/n must shift the perihelion time by -M0/n
        let n = 0.01;
        let m0 = 0.2;
        let plain = OrbitElements::hyperbolic(0.0, 1.0, 1.1, 0.0, 0.0, 0.0).unwrap();
        let shifted = plain.clone().with_mean_anomaly(m0, n);
        let a = solve(&plain, 5.0 + m0 / n).unwrap();
        let b = solve(&shifted, 5.0).unwrap();
        assert_relative_eq!(a.true_anomaly, b.true_anomaly, epsilon = 1e-12);
        assert_relative_eq!(a.distance, b.distance, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_mean_motion() {
        let el = OrbitElements::hyperbolic(0.0, 1.0, 1.1, 0.0, 0.0, 0.0)
            .unwrap()
            .with_mean_anomaly(0.3, 0.0);
        assert!(matches!(
            solve(&el, 10.0),
            Err(AnomalyError::InvalidMeanMotion { .. })
        ));
    }

    #[test]
    fn test_escape_hatch_far_from_perihelion() {
        let el = OrbitElements::elliptic(0.0, 50.0, 0.98, 0.0, 0.0, 0.0, 0.0).unwrap();
        let n = el.mean_motion;

        let result = solve(&el, 0.3 / n).unwrap();
        let ecc = solve_kepler(0.3, 0.98).unwrap();
        let nu = 2.0 * ((1.98_f64 / 0.02).sqrt() * (ecc / 2.0).tan()).atan();
        assert_abs_diff_eq!(result.true_anomaly, nu, epsilon = 1e-9);
        assert_relative_eq!(result.distance, 50.0 * (1.0 - 0.98 * ecc.cos()), max_relative = 1e-8);

        // Past ν ≈ 165° the series no longer converges within its term budget
        assert!(matches!(
            solve(&el, 0.45 / n),
            Err(AnomalyError::NoSeriesConvergence { .. })
        ));
    }

    #[test]
    fn test_outer_loop_is_capped() {
        // The outer iteration settles into a two-cycle here
        let el = OrbitElements::hyperbolic(0.0, 0.3, 1.001, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(
            solve(&el, 1e5),
            Err(AnomalyError::NoConvergence {
                method: "universal-variable",
                iterations: MAX_UNIVERSAL_ITERATIONS,
            })
        );
    }

    #[test]
    fn test_diverging_series_is_reported() {
        // A strongly hyperbolic orbit far from perihelion is outside the
        // series' radius of convergence
        let el = OrbitElements::hyperbolic(0.0, 0.1, 3.0, 0.0, 0.0, 0.0).unwrap();
        assert!(matches!(
            solve(&el, 2_000.0),
            Err(AnomalyError::NoSeriesConvergence { .. })
        ));
    }
}
