//! Calibrated per-kilometer split integration over speed samples.
//!
//! Raw integrated distance from consumer-grade instantaneous speed readings
//! drifts from the true GPS distance. Scaling the integration by the
//! session-level total preserves the pacing shape while enforcing the known
//! total.

use chrono::{DateTime, Duration, Utc};
use stride_domain::constants::{KILOMETER_METERS, PARTIAL_SPLIT_NOISE_METERS};
use stride_domain::{PaceSplit, SpeedSample};

/// Compute per-kilometer splits from speed samples.
///
/// Samples may arrive unsorted; they are sorted by timestamp first. When
/// `session_start` precedes the first sample, a synthetic zero-speed sample
/// is prepended so kilometer 1 is timed from the real session start rather
/// than the first (possibly late) telemetry reading.
///
/// Distance is integrated with the trapezoidal rule and calibrated by
/// `total_distance_meters / raw_total` when an authoritative total is given.
/// Kilometer boundary crossings are located by linear interpolation within
/// the interval; a single interval may cross several boundaries. Residual
/// distance beyond the last full kilometer becomes one trailing partial
/// split, unless it is below the noise threshold.
///
/// Fewer than two samples produce an empty split list, not an error.
#[must_use]
pub fn compute_splits(
    samples: &[SpeedSample],
    total_distance_meters: Option<f64>,
    session_start: Option<DateTime<Utc>>,
) -> Vec<PaceSplit> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let mut sorted: Vec<SpeedSample> = samples.to_vec();
    sorted.sort_by_key(|sample| sample.timestamp);

    if let Some(start) = session_start {
        if start < sorted[0].timestamp {
            sorted.insert(0, SpeedSample { timestamp: start, meters_per_second: 0.0 });
        }
    }

    let raw_total: f64 =
        sorted.windows(2).map(|pair| raw_interval_distance(&pair[0], &pair[1])).sum();

    let scale_factor = match total_distance_meters {
        Some(total) if raw_total > 0.0 => total / raw_total,
        _ => 1.0,
    };

    let mut splits = Vec::new();
    let mut cumulative_distance = 0.0;
    let mut split_start_time = sorted[0].timestamp;
    let mut current_km: u32 = 1;
    let mut cumulative_duration = Duration::zero();

    for pair in sorted.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let elapsed_ms = (to.timestamp - from.timestamp).num_milliseconds();
        let interval_distance = raw_interval_distance(from, to) * scale_factor;
        let distance_before_interval = cumulative_distance;
        cumulative_distance += interval_distance;

        // One interval can cross several kilometer boundaries.
        while cumulative_distance >= f64::from(current_km) * KILOMETER_METERS {
            let boundary_distance = f64::from(current_km) * KILOMETER_METERS;
            let fraction = if interval_distance > 0.0 {
                (boundary_distance - distance_before_interval) / interval_distance
            } else {
                0.0
            };
            let boundary_time =
                from.timestamp + Duration::milliseconds((elapsed_ms as f64 * fraction) as i64);

            let split_duration = boundary_time - split_start_time;
            cumulative_duration += split_duration;
            splits.push(PaceSplit {
                kilometer_number: current_km,
                distance_meters: KILOMETER_METERS,
                split_duration,
                // Distance is exactly 1 km, so pace equals the split time.
                split_pace_seconds_per_km: duration_seconds(split_duration),
                cumulative_duration,
                is_partial: false,
            });

            split_start_time = boundary_time;
            current_km += 1;
        }
    }

    let residual = cumulative_distance - f64::from(current_km - 1) * KILOMETER_METERS;
    if residual > PARTIAL_SPLIT_NOISE_METERS {
        let last_sample_time = sorted[sorted.len() - 1].timestamp;
        let split_duration = last_sample_time - split_start_time;
        cumulative_duration += split_duration;
        splits.push(PaceSplit {
            kilometer_number: current_km,
            distance_meters: residual,
            split_duration,
            split_pace_seconds_per_km: duration_seconds(split_duration)
                / (residual / KILOMETER_METERS),
            cumulative_duration,
            is_partial: true,
        });
    }

    splits
}

/// Trapezoidal rule: average of adjacent speeds times elapsed seconds.
fn raw_interval_distance(from: &SpeedSample, to: &SpeedSample) -> f64 {
    let elapsed_seconds = (to.timestamp - from.timestamp).num_milliseconds() as f64 / 1000.0;
    0.5 * (from.meters_per_second + to.meters_per_second) * elapsed_seconds
}

fn duration_seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}
