//! Synthetic rest-stop catalog
//!
//! Rest stops are generated locally around the reference location; there is
//! no map service behind this catalog.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::geo::{round1, GeoPoint};

/// Default number of generated stops
pub const DEFAULT_STOP_COUNT: usize = 15;

/// Maximum latitude/longitude offset from the reference (degrees)
pub const MAX_OFFSET_DEG: f64 = 0.025;

const NAME_POOL: [&str; 11] = [
    "Highway Rest Stop",
    "Quick Nap Zone",
    "24/7 Gas Station",
    "Roadside Cafe",
    "Budget Inn",
    "Safe Parking Area",
    "Driver's Rest Point",
    "Coffee Break Stop",
    "Truck Stop",
    "Rest & Refresh",
    "Highway Oasis",
];

const AMENITIES: [&str; 11] = [
    "Restrooms",
    "Coffee",
    "Food",
    "Wifi",
    "Shower",
    "Gas",
    "ATM",
    "Convenience Store",
    "Parking",
    "24/7 Service",
    "EV Charging",
];

/// Kind of rest stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    RestArea,
    GasStation,
    ParkingArea,
    ServicePlaza,
    HotelMotel,
}

impl StopKind {
    pub const ALL: [StopKind; 5] = [
        StopKind::RestArea,
        StopKind::GasStation,
        StopKind::ParkingArea,
        StopKind::ServicePlaza,
        StopKind::HotelMotel,
    ];

    /// Human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            StopKind::RestArea => "Rest Area",
            StopKind::GasStation => "Gas Station",
            StopKind::ParkingArea => "Parking Area",
            StopKind::ServicePlaza => "Service Plaza",
            StopKind::HotelMotel => "Hotel/Motel",
        }
    }
}

impl fmt::Display for StopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point of interest where the driver can rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestStop {
    pub id: String,
    pub name: String,
    pub kind: StopKind,
    pub location: GeoPoint,
    /// Distinct amenity labels
    pub amenities: Vec<String>,
    /// Rating in [3.0, 5.0], one decimal
    pub rating: f64,
}

/// Rest stops around one reference location
#[derive(Debug, Clone)]
pub struct RestStopCatalog {
    reference: GeoPoint,
    stops: Vec<RestStop>,
    count: usize,
    seed: Option<u64>,
}

impl RestStopCatalog {
    /// Generate `count` stops around `reference`.
    ///
    /// With a seed the catalog is reproducible; without one it differs per run.
    pub fn initialize(reference: GeoPoint, count: usize, seed: Option<u64>) -> Self {
        let stops = generate(reference, count, seed);
        info!(
            "Rest stop catalog initialized: {} stops around {}",
            stops.len(),
            reference
        );
        Self {
            reference,
            stops,
            count,
            seed,
        }
    }

    /// Replace the whole catalog with stops around a new reference
    pub fn relocate(&mut self, reference: GeoPoint) {
        debug!("Relocating rest stop catalog {} -> {}", self.reference, reference);
        self.stops = generate(reference, self.count, self.seed);
        self.reference = reference;
    }

    /// Location the catalog was generated around
    pub fn reference(&self) -> GeoPoint {
        self.reference
    }

    /// Stops in insertion order
    pub fn stops(&self) -> &[RestStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

fn generate(reference: GeoPoint, count: usize, seed: Option<u64>) -> Vec<RestStop> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..count)
        .map(|i| {
            let dlat = (rng.gen::<f64>() - 0.5) * 2.0 * MAX_OFFSET_DEG;
            let dlng = (rng.gen::<f64>() - 0.5) * 2.0 * MAX_OFFSET_DEG;
            let name = NAME_POOL[rng.gen_range(0..NAME_POOL.len())];
            let kind = StopKind::ALL[rng.gen_range(0..StopKind::ALL.len())];

            RestStop {
                id: format!("stop_{i}"),
                name: format!("{name} #{}", i + 1),
                kind,
                location: reference.offset(dlat, dlng),
                amenities: random_amenities(&mut rng),
                rating: round1(rng.gen_range(3.0..=5.0)),
            }
        })
        .collect()
}

fn random_amenities(rng: &mut StdRng) -> Vec<String> {
    let n = rng.gen_range(2..=5);
    AMENITIES
        .choose_multiple(rng, n)
        .map(|a| a.to_string())
        .collect()
}
