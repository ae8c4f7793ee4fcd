use serde::{Deserialize, Serialize};

/// Converts a probability in `(0, 1)` to log-odds.
#[inline]
pub fn log_odds(probability: f32) -> f32 {
    (probability / (1.0 - probability)).ln()
}

/// Converts log-odds back to a probability in `(0, 1)`.
#[inline]
pub fn probability(log_odds: f32) -> f32 {
    1.0 - 1.0 / (1.0 + log_odds.exp())
}

/// The sensor model and classification thresholds of an `OccupancyOctree`, stored as log-odds.
///
/// Every node's value is kept within `[clamping_min, clamping_max]`. A node is considered occupied
/// iff its value is at least `occupancy_threshold`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct OccupancyParams {
    hit: f32,
    miss: f32,
    clamping_min: f32,
    clamping_max: f32,
    occupancy_threshold: f32,
}

impl Default for OccupancyParams {
    fn default() -> Self {
        Self::from_probabilities(0.7, 0.4, 0.1192, 0.971, 0.5)
    }
}

impl OccupancyParams {
    pub fn from_probabilities(
        prob_hit: f32,
        prob_miss: f32,
        clamping_min: f32,
        clamping_max: f32,
        occupancy_threshold: f32,
    ) -> Self {
        Self {
            hit: log_odds(prob_hit),
            miss: log_odds(prob_miss),
            clamping_min: log_odds(clamping_min),
            clamping_max: log_odds(clamping_max),
            occupancy_threshold: log_odds(occupancy_threshold),
        }
    }

    /// The log-odds increment applied when a voxel is observed as occupied.
    pub fn hit(&self) -> f32 {
        self.hit
    }

    /// The log-odds increment applied when a voxel is observed as free (usually negative).
    pub fn miss(&self) -> f32 {
        self.miss
    }

    pub fn clamping_min(&self) -> f32 {
        self.clamping_min
    }

    pub fn clamping_max(&self) -> f32 {
        self.clamping_max
    }

    /// The occupancy threshold in log-odds.
    pub fn occupancy_threshold_log_odds(&self) -> f32 {
        self.occupancy_threshold
    }

    /// The occupancy threshold as a probability.
    pub fn occupancy_threshold(&self) -> f32 {
        probability(self.occupancy_threshold)
    }

    #[inline]
    pub fn is_occupied(&self, log_odds: f32) -> bool {
        log_odds >= self.occupancy_threshold
    }

    #[inline]
    pub fn clamp(&self, log_odds: f32) -> f32 {
        log_odds.max(self.clamping_min).min(self.clamping_max)
    }

    /// The binary classification of `log_odds`, expressed as the most confident value of its class.
    #[inline]
    pub fn max_likelihood(&self, log_odds: f32) -> f32 {
        if self.is_occupied(log_odds) {
            self.clamping_max
        } else {
            self.clamping_min
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_odds_inverts_probability() {
        for &p in [0.1192f32, 0.4, 0.5, 0.7, 0.971].iter() {
            assert!((probability(log_odds(p)) - p).abs() < 1e-5);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let params = OccupancyParams::default();

        assert!(params.is_occupied(params.occupancy_threshold_log_odds()));
        assert!(!params.is_occupied(params.miss()));
        assert!(params.is_occupied(params.hit()));
    }

    #[test]
    fn max_likelihood_snaps_to_clamping_bounds() {
        let params = OccupancyParams::default();

        assert_eq!(params.max_likelihood(params.hit()), params.clamping_max());
        assert_eq!(params.max_likelihood(params.miss()), params.clamping_min());
    }
}
