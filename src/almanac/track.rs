use super::{next_crossing, Direction, EventError, EventQuery, Result, RiseSet};
use crate::celestial::{Astrometric, PositionModel};
use crate::constants::{SIDEREAL_DAY, TAU};
use crate::earthlib::Topos;
use crate::framelib::{hour_angle, HorizonSample};
use crate::orbit::normalize_angle;
use log::trace;

/// An object followed across the sky of one observer
///
/// Holds the position computed at the last [`RiseSet::advance_to`], which the
/// closed-form crossing estimate treats as fixed.
#[derive(Debug, Clone)]
pub struct SkyTrack<M: PositionModel> {
    model: M,
    topos: Topos,
    astrometric: Astrometric,
    sample: HorizonSample,
}

impl<M: PositionModel> SkyTrack<M> {
    /// Start following `model` from `topos` at Julian date `jd`
    pub fn new(model: M, topos: Topos, jd: f64) -> Result<Self> {
        let astrometric = model.astrometric(jd)?;
        let sample = topos.horizontal(&astrometric.position, astrometric.distance, jd);
        Ok(Self {
            model,
            topos,
            astrometric,
            sample,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn topos(&self) -> &Topos {
        &self.topos
    }

    /// Geocentric position at the current time
    pub fn astrometric(&self) -> &Astrometric {
        &self.astrometric
    }

    /// Horizontal position at the current time
    pub fn sample(&self) -> &HorizonSample {
        &self.sample
    }

    /// Next rising through `threshold` radians at or after `origin`
    pub fn next_rising(&mut self, threshold: f64, origin: f64) -> Result<f64> {
        next_crossing(self, &EventQuery::rising(threshold, origin))
    }

    /// Next setting through `threshold` radians at or after `origin`
    pub fn next_setting(&mut self, threshold: f64, origin: f64) -> Result<f64> {
        next_crossing(self, &EventQuery::setting(threshold, origin))
    }
}

impl<M: PositionModel> RiseSet for SkyTrack<M> {
    fn advance_to(&mut self, jd: f64) -> Result<()> {
        self.astrometric = self.model.astrometric(jd)?;
        self.sample =
            self.topos
                .horizontal(&self.astrometric.position, self.astrometric.distance, jd);
        Ok(())
    }

    fn current_elevation(&self) -> f64 {
        self.sample.elevation
    }

    fn estimate_crossing(&self, threshold: f64, direction: Direction) -> Result<f64> {
        let latitude = self.topos.latitude;
        let dec = self.astrometric.position.dec;
        let cos_h0 =
            (threshold.sin() - latitude.sin() * dec.sin()) / (latitude.cos() * dec.cos());

        // Also catches NaN at the poles
        if !(cos_h0.abs() <= 1.0) {
            return Err(EventError::Circumpolar {
                direction,
                threshold,
            });
        }

        let h0 = cos_h0.acos();
        let target = match direction {
            Direction::Rise => -h0,
            Direction::Set => h0,
        };
        let now = self.sample.time;
        let current = hour_angle(
            self.topos.local_sidereal_time(now),
            self.astrometric.position.ra,
        );
        let delta = normalize_angle(target - current);
        trace!(
            "{}: H = {current:.6}, target {target:.6}, {direction} in {:.6} d",
            self.model.name(),
            delta / TAU * SIDEREAL_DAY
        );
        Ok(now + delta / TAU * SIDEREAL_DAY)
    }
}
