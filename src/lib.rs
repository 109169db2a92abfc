//! Starwatch: positions, rises and sets of Solar System bodies
//!
//! The crate is built around two numerical solvers:
//!
//! - [`orbit::anomaly`] turns a fixed set of two-body elements and a time
//!   into true anomaly and heliocentric distance, for elliptic, parabolic and
//!   hyperbolic orbits alike.
//! - [`almanac`] finds the next time an object's elevation crosses a
//!   threshold, driving any [`celestial::PositionModel`] through a
//!   [`almanac::SkyTrack`].
//!
//! Everything else (frames, sidereal time, low-precision planet, Sun and
//! Moon models, calendar conversion) is the minimum needed to feed them.
//!
//! ```no_run
//! use starwatch::{almanac::SkyTrack, Body, SolarSystemBody, Topos};
//!
//! let sun = SolarSystemBody::new(Body::Sun)?;
//! let origin = starwatch::time::parse_jd("2024-06-21")?;
//! let mut track = SkyTrack::new(sun, Topos::from_degrees(51.48, 0.0), origin)?;
//! let sunrise = track.next_rising(-0.8333_f64.to_radians(), origin)?;
//! println!("{}", starwatch::time::format_jd(sunrise)?);
//! # Ok::<(), starwatch::StarwatchError>(())
//! ```

use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod almanac;
pub mod celestial;
pub mod constants;
pub mod earthlib;
pub mod framelib;
pub mod orbit;
pub mod planetlib;
pub mod time;

// Re-export commonly used types
pub use almanac::{next_crossing, Direction, EventError, EventQuery, RiseSet, SkyTrack};
pub use celestial::{FixedStar, MinorBody, PositionModel, SolarSystemBody};
pub use earthlib::Topos;
pub use orbit::{AnomalyError, AnomalyResult, OrbitElements, OrbitShape};
pub use planetlib::{Body, PlanetError};

/// Main error type for the starwatch library
#[derive(Debug, Error)]
pub enum StarwatchError {
    #[error("Time error: {0}")]
    Time(#[from] time::TimeError),

    #[error("Orbit error: {0}")]
    Anomaly(#[from] AnomalyError),

    #[error("Planet error: {0}")]
    Planet(#[from] PlanetError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),
}

/// Result type for starwatch operations
pub type Result<T> = std::result::Result<T, StarwatchError>;

/// Entry point for loading orbital element files
#[derive(Debug, Clone, Default)]
pub struct Loader {
    data_dir: Option<PathBuf>,
}

impl Loader {
    /// Create a new loader that resolves paths against the working directory
    pub fn new() -> Self {
        Self { data_dir: None }
    }

    /// Set a directory that relative paths are resolved against
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load a JSON array of named element sets, validating each one
    pub fn load_minor_bodies<P: AsRef<Path>>(&self, path: P) -> Result<Vec<MinorBody>> {
        let path = self.resolve(path.as_ref());
        let reader = BufReader::new(File::open(&path)?);
        let bodies: Vec<MinorBody> = serde_json::from_reader(reader)?;
        for body in &bodies {
            body.elements.validate().map_err(|err| match err {
                AnomalyError::InvalidElements(msg) => {
                    AnomalyError::InvalidElements(format!("{}: {msg}", body.name))
                }
                other => other,
            })?;
        }
        debug!("loaded {} element sets from {}", bodies.len(), path.display());
        Ok(bodies)
    }

    /// Load one element set by name (case-insensitive) from a JSON file
    pub fn load_minor_body<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<MinorBody> {
        self.load_minor_bodies(path)?
            .into_iter()
            .find(|body| body.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| StarwatchError::ObjectNotFound(name.to_string()))
    }
}
