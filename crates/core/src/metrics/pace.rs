//! Pace conversion over speed samples.

use chrono::Duration;
use stride_domain::{PaceSample, SpeedSample};

/// Convert speed in m/s to pace in seconds per km.
///
/// Returns `None` for zero or negative speed: stationary samples are
/// excluded, not zero-paced.
#[must_use]
pub fn speed_to_pace(meters_per_second: f64) -> Option<f64> {
    if meters_per_second <= 0.0 {
        return None;
    }
    Some(1000.0 / meters_per_second)
}

/// Compute average pace from total active duration and total distance.
///
/// Returns `None` if the distance is zero or negative.
#[must_use]
pub fn average_pace(active_duration: Duration, distance_meters: f64) -> Option<f64> {
    if distance_meters <= 0.0 {
        return None;
    }
    let total_seconds = active_duration.num_milliseconds() as f64 / 1000.0;
    Some(total_seconds / (distance_meters / 1000.0))
}

/// Convert timestamped speed samples to pace samples, dropping stationary
/// readings. Order-preserving.
#[must_use]
pub fn to_pace_samples(speed_samples: &[SpeedSample]) -> Vec<PaceSample> {
    speed_samples
        .iter()
        .filter_map(|sample| {
            speed_to_pace(sample.meters_per_second)
                .map(|pace| PaceSample { timestamp: sample.timestamp, seconds_per_km: pace })
        })
        .collect()
}
