//! Proximity ranking

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::RestStop;
use crate::geo::{haversine_km, round1, GeoPoint};

/// A rest stop with its distance from the reference location
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStop {
    pub stop: RestStop,
    /// Great-circle distance in kilometres, rounded to one decimal
    pub distance_km: f64,
}

/// Radius filter + nearest-first ordering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProximityRanker {
    pub max_distance_km: f64,
    pub top_k: usize,
}

impl Default for ProximityRanker {
    fn default() -> Self {
        Self {
            max_distance_km: 50.0,
            top_k: 5,
        }
    }
}

impl ProximityRanker {
    pub fn new(max_distance_km: f64, top_k: usize) -> Self {
        Self {
            max_distance_km,
            top_k,
        }
    }

    /// Stops within range, nearest first, at most `top_k`.
    ///
    /// The radius applies to the exact distance; ordering uses the rounded
    /// distance, so stops showing the same distance keep catalog order. An
    /// empty result is a valid "nothing nearby" answer.
    pub fn rank(&self, reference: GeoPoint, stops: &[RestStop]) -> Vec<RankedStop> {
        let mut ranked: Vec<RankedStop> = stops
            .iter()
            .filter_map(|stop| {
                let distance = haversine_km(reference, stop.location);
                (distance <= self.max_distance_km).then(|| RankedStop {
                    stop: stop.clone(),
                    distance_km: round1(distance),
                })
            })
            .collect();

        // `sort_by` is stable
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked.truncate(self.top_k);

        debug!(
            "Ranked {} of {} stops within {} km",
            ranked.len(),
            stops.len(),
            self.max_distance_km
        );
        ranked
    }
}
