//! Starwatch command-line tool
//!
//! Prints where a Sun, Moon, planet or comet sits in the sky of an observer,
//! and when it next rises or sets.
//!
//! Usage:
//!   starwatch position --body mars --at 2024-03-01T21:00:00Z --lat 51.48 --lon 0
//!   starwatch rise --body sun --from 2024-06-21 --lat 51.48 --lon 0 --threshold -0.8333
//!   starwatch set --elements comets.json --name "C/2023 A3" --from 2024-10-01 --lat 35 --lon 139.7
//!
//! Set `RUST_LOG=starwatch=debug` to follow the event solver.

use clap::{Args, Parser, Subcommand};
use starwatch::almanac::{next_crossing, Direction, EventQuery, SkyTrack};
use starwatch::celestial::PositionModel;
use starwatch::constants::{DEG2RAD, RAD2DEG};
use starwatch::time::{format_jd, parse_jd};
use starwatch::{Body, EventError, Loader, Result, SolarSystemBody, StarwatchError, Topos};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Starwatch ephemeris tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Positions, rises and sets of Solar System bodies",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the position of an object at one instant
    Position {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        site: Site,

        /// Time as RFC 3339, YYYY-MM-DD or "JD <number>"
        #[arg(long)]
        at: String,
    },

    /// Find the next risings of an object
    Rise(EventArgs),

    /// Find the next settings of an object
    Set(EventArgs),
}

#[derive(Args, Debug)]
struct EventArgs {
    #[command(flatten)]
    target: Target,

    #[command(flatten)]
    site: Site,

    /// Start of the search, as RFC 3339, YYYY-MM-DD or "JD <number>"
    #[arg(long)]
    from: String,

    /// Elevation threshold in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    threshold: f64,

    /// Number of consecutive events to list
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[derive(Args, Debug)]
struct Target {
    /// Major body: sun, moon, mercury ... pluto
    #[arg(long, conflicts_with = "elements")]
    body: Option<String>,

    /// JSON file with an array of comet or asteroid element sets
    #[arg(long, requires = "name")]
    elements: Option<PathBuf>,

    /// Name of the element set to use from --elements
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct Site {
    /// Observer latitude in degrees, north positive
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Observer longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
}

impl Site {
    fn topos(&self) -> Topos {
        Topos::from_degrees(self.lat, self.lon)
    }
}

impl Target {
    fn model(&self) -> Result<Box<dyn PositionModel>> {
        match (&self.body, &self.elements, &self.name) {
            (Some(body), _, _) => {
                let body: Body = body.parse()?;
                Ok(Box::new(SolarSystemBody::new(body)?))
            }
            (None, Some(path), Some(name)) => {
                Ok(Box::new(Loader::new().load_minor_body(path, name)?))
            }
            _ => Err(StarwatchError::ObjectNotFound(
                "give --body, or --elements with --name".to_string(),
            )),
        }
    }
}

fn show_position(target: &Target, site: &Site, at: &str) -> Result<()> {
    let jd = parse_jd(at)?;
    let track = SkyTrack::new(target.model()?, site.topos(), jd)?;
    let astrometric = track.astrometric();
    let sample = track.sample();

    println!("{} at {}", track.model().name(), format_jd(jd)?);
    println!(
        "  RA {:.4} h  Dec {:+.4}°",
        astrometric.position.ra_hours(),
        astrometric.position.dec_degrees()
    );
    let ecliptic = astrometric.ecliptic();
    println!(
        "  Ecliptic lon {:.4}°  lat {:+.4}°",
        ecliptic.lon_degrees(),
        ecliptic.lat_degrees()
    );
    if astrometric.distance > 0.0 {
        println!("  Distance {:.6} au", astrometric.distance);
    }
    println!(
        "  Azimuth {:.3}°  Elevation {:+.3}°",
        sample.azimuth * RAD2DEG,
        sample.elevation * RAD2DEG
    );
    Ok(())
}

fn show_events(args: &EventArgs, direction: Direction) -> Result<()> {
    let origin = parse_jd(&args.from)?;
    let mut track = SkyTrack::new(args.target.model()?, args.site.topos(), origin)?;
    let name = track.model().name().to_string();
    let mut query = EventQuery::new(args.threshold * DEG2RAD, direction, origin);

    for _ in 0..args.count {
        match next_crossing(&mut track, &query) {
            Ok(time) => {
                println!("{name} {direction}: {}", format_jd(time)?);
                // One minute past the event so the same crossing is not found again
                query = query.with_origin(time + 1.0 / starwatch::constants::DAY_MIN);
            }
            Err(EventError::Circumpolar { .. }) => {
                println!(
                    "{name} does not {direction} through {:+.3}° after {}",
                    args.threshold,
                    format_jd(query.origin)?
                );
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Position { target, site, at } => show_position(target, site, at),
        Command::Rise(args) => show_events(args, Direction::Rise),
        Command::Set(args) => show_events(args, Direction::Set),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
