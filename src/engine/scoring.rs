use serde::{Deserialize, Serialize};

use crate::session::result::SessionResult;

pub const MIN_CPM_SPEED: u32 = 100;
pub const MIN_PRECISION: f64 = 98.0;

/// Speed and accuracy a session must both reach to count as a pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_cpm: u32,
    pub min_precision: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_cpm: MIN_CPM_SPEED,
            min_precision: MIN_PRECISION,
        }
    }
}

pub fn passes(result: &SessionResult, thresholds: &Thresholds) -> bool {
    result.cpm >= thresholds.min_cpm && result.accuracy >= thresholds.min_precision
}

/// How far along the speed and accuracy bars a result is, each capped at 1.
pub fn progress_towards(result: &SessionResult, thresholds: &Thresholds) -> (f64, f64) {
    let speed = if thresholds.min_cpm == 0 {
        1.0
    } else {
        (result.cpm as f64 / thresholds.min_cpm as f64).min(1.0)
    };
    let precision = if thresholds.min_precision <= 0.0 {
        1.0
    } else {
        (result.accuracy / thresholds.min_precision).min(1.0)
    };
    (speed, precision)
}
