//! Rise and set times
//!
//! [`next_crossing`] finds the next instant at which an object's elevation
//! crosses a threshold in a given direction. It needs only three things from
//! the object, collected in the [`RiseSet`] trait: move to a time, report the
//! current elevation, and make a closed-form guess at the crossing assuming
//! the object stops moving.
//!
//! The guess is refined by fixed-point iteration, which absorbs the object's
//! own motion. When the closed-form guess reports the object circumpolar, or
//! the iteration fails to settle, the search falls back to a brute-force scan
//! of the elevation at one-minute steps.

mod track;

pub use track::SkyTrack;

use crate::constants::{DAY_MIN, DAY_S, SIDEREAL_DAY};
use crate::orbit::AnomalyError;
use crate::planetlib::PlanetError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which way the elevation is moving through the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rise,
    Set,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rise => f.write_str("rise"),
            Direction::Set => f.write_str("set"),
        }
    }
}

/// Error type for event searches
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EventError {
    /// The object never crosses the threshold in the searched window. This
    /// is an ordinary outcome, not a failure of the solver.
    #[error("No {direction} through {threshold} rad: object is circumpolar")]
    Circumpolar { direction: Direction, threshold: f64 },

    #[error("Invalid event query: {0}")]
    InvalidQuery(String),

    #[error("Position error: {0}")]
    Position(#[from] PlanetError),
}

impl From<AnomalyError> for EventError {
    fn from(err: AnomalyError) -> Self {
        EventError::Position(PlanetError::Orbit(err))
    }
}

/// Result type for event searches
pub type Result<T> = std::result::Result<T, EventError>;

/// Capabilities the event solver needs from a moving object
pub trait RiseSet {
    /// Recompute the cached position for Julian date `jd`
    fn advance_to(&mut self, jd: f64) -> Result<()>;

    /// Elevation in radians at the cached position
    fn current_elevation(&self) -> f64;

    /// Closed-form crossing time treating the cached position as fixed;
    /// fails with [`EventError::Circumpolar`] when that position never crosses
    fn estimate_crossing(&self, threshold: f64, direction: Direction) -> Result<f64>;
}

/// One rise or set search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Elevation threshold in radians
    pub threshold: f64,
    pub direction: Direction,
    /// Julian date the search starts from
    pub origin: f64,
    pub max_naive_iterations: usize,
    /// Fixed-point convergence, days
    pub naive_convergence_days: f64,
    /// Fallback scan step, days
    pub fallback_step_days: f64,
    pub fallback_max_steps: usize,
    /// Step used to move a guess that lands before `origin`, days
    pub period_days: f64,
}

impl EventQuery {
    pub fn new(threshold: f64, direction: Direction, origin: f64) -> Self {
        Self {
            threshold,
            direction,
            origin,
            max_naive_iterations: 100,
            naive_convergence_days: 0.01 / DAY_S,
            fallback_step_days: 1.0 / DAY_MIN,
            fallback_max_steps: 2000,
            period_days: SIDEREAL_DAY,
        }
    }

    pub fn rising(threshold: f64, origin: f64) -> Self {
        Self::new(threshold, Direction::Rise, origin)
    }

    pub fn setting(threshold: f64, origin: f64) -> Self {
        Self::new(threshold, Direction::Set, origin)
    }

    pub fn with_origin(mut self, origin: f64) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_max_naive_iterations(mut self, iterations: usize) -> Self {
        self.max_naive_iterations = iterations;
        self
    }

    pub fn with_naive_convergence_days(mut self, days: f64) -> Self {
        self.naive_convergence_days = days;
        self
    }

    pub fn with_fallback(mut self, step_days: f64, max_steps: usize) -> Self {
        self.fallback_step_days = step_days;
        self.fallback_max_steps = max_steps;
        self
    }

    pub fn with_period_days(mut self, period_days: f64) -> Self {
        self.period_days = period_days;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.origin.is_finite() || !self.threshold.is_finite() {
            return Err(EventError::InvalidQuery(format!(
                "origin {} and threshold {} must be finite",
                self.origin, self.threshold
            )));
        }
        if !(self.period_days > 0.0 && self.period_days.is_finite()) {
            return Err(EventError::InvalidQuery(format!(
                "period must be positive, got {}",
                self.period_days
            )));
        }
        if !(self.fallback_step_days > 0.0 && self.fallback_step_days.is_finite()) {
            return Err(EventError::InvalidQuery(format!(
                "fallback step must be positive, got {}",
                self.fallback_step_days
            )));
        }
        Ok(())
    }

    fn circumpolar(&self) -> EventError {
        EventError::Circumpolar {
            direction: self.direction,
            threshold: self.threshold,
        }
    }

    /// Move `guess` forward by whole periods until it is not before `origin`
    fn roll_forward(&self, guess: f64) -> f64 {
        if guess >= self.origin {
            return guess;
        }
        let periods = ((self.origin - guess) / self.period_days).ceil();
        let rolled = guess + periods * self.period_days;
        if rolled < self.origin {
            rolled + self.period_days
        } else {
            rolled
        }
    }
}

/// Next time at or after `query.origin` when `object` crosses the threshold
///
/// Leaves `object` advanced to some time inside the search; callers that
/// need its state at the returned time should advance it again.
pub fn next_crossing<O: RiseSet + ?Sized>(object: &mut O, query: &EventQuery) -> Result<f64> {
    query.validate()?;
    match iterate_estimate(object, query) {
        Ok(Some(time)) => Ok(time),
        Ok(None) => {
            warn!(
                "{} estimate did not settle in {} iterations, scanning instead",
                query.direction, query.max_naive_iterations
            );
            scan_for_crossing(object, query)
        }
        Err(EventError::Circumpolar { .. }) => {
            debug!(
                "closed-form {} estimate reports circumpolar, scanning instead",
                query.direction
            );
            scan_for_crossing(object, query)
        }
        Err(err) => Err(err),
    }
}

/// Fixed-point refinement of the closed-form estimate; `None` if it does
/// not converge within the iteration budget
fn iterate_estimate<O: RiseSet + ?Sized>(
    object: &mut O,
    query: &EventQuery,
) -> Result<Option<f64>> {
    object.advance_to(query.origin)?;
    let mut guess =
        query.roll_forward(object.estimate_crossing(query.threshold, query.direction)?);

    for iteration in 1..=query.max_naive_iterations {
        object.advance_to(guess)?;
        let next =
            query.roll_forward(object.estimate_crossing(query.threshold, query.direction)?);
        if (next - guess).abs() < query.naive_convergence_days {
            debug!(
                "{} converged after {iteration} iterations at JD {next}",
                query.direction
            );
            return Ok(Some(next));
        }
        guess = next;
    }
    Ok(None)
}

/// Brute-force search: sample the elevation at fixed steps from the origin
/// and interpolate linearly inside the first step that straddles the threshold
pub fn scan_for_crossing<O: RiseSet + ?Sized>(object: &mut O, query: &EventQuery) -> Result<f64> {
    query.validate()?;
    let threshold = query.threshold;

    object.advance_to(query.origin)?;
    let mut previous_time = query.origin;
    let mut previous = object.current_elevation();

    for step in 1..=query.fallback_max_steps {
        let time = query.origin + step as f64 * query.fallback_step_days;
        object.advance_to(time)?;
        let elevation = object.current_elevation();

        let straddles = match query.direction {
            Direction::Rise => previous <= threshold && threshold < elevation,
            Direction::Set => previous >= threshold && threshold > elevation,
        };
        if straddles {
            let fraction = (threshold - previous) / (elevation - previous);
            let crossing = previous_time + fraction * (time - previous_time);
            debug!("scan found {} after {step} steps at JD {crossing}", query.direction);
            return Ok(crossing);
        }

        previous_time = time;
        previous = elevation;
    }

    Err(query.circumpolar())
}
