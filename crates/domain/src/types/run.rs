//! Run telemetry types: sessions, samples, and derived splits.

use chrono::{DateTime, Duration, Timelike, Utc};

/// A single instantaneous speed reading from the telemetry source.
///
/// Input sequences may be unsorted and may contain zero or near-zero speeds
/// (stationary samples).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub timestamp: DateTime<Utc>,
    pub meters_per_second: f64,
}

/// A derived pace reading. Stationary source samples are excluded, so pace is
/// always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceSample {
    pub timestamp: DateTime<Utc>,
    pub seconds_per_km: f64,
}

/// A single heart-rate reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartRateSample {
    pub timestamp: DateTime<Utc>,
    pub bpm: i64,
}

/// A completed run as reported by the telemetry source.
///
/// `distance_meters` is the authoritative session total (typically
/// GPS-derived) and is used to calibrate split integration. Immutable once
/// constructed; recomputed wholesale on each full refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSession {
    /// Stable, source-assigned identifier.
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance_meters: f64,
    pub active_duration: Duration,
    pub average_pace_seconds_per_km: Option<f64>,
    pub average_heart_rate_bpm: Option<i64>,
    /// Time-of-day label, derived from `start_time`.
    pub title: String,
}

/// Performance summary for one kilometer of a run.
///
/// Ordered sequences have `kilometer_number` strictly increasing by 1 from 1;
/// only the final element may be partial (distance < 1000 m).
#[derive(Debug, Clone, PartialEq)]
pub struct PaceSplit {
    pub kilometer_number: u32,
    pub distance_meters: f64,
    pub split_duration: Duration,
    pub split_pace_seconds_per_km: f64,
    pub cumulative_duration: Duration,
    pub is_partial: bool,
}

/// Full per-session detail, assembled on demand from the telemetry source.
/// Not cached long-term.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDetail {
    pub session: RunSession,
    pub total_steps: i64,
    pub heart_rate_samples: Vec<HeartRateSample>,
    pub pace_samples: Vec<PaceSample>,
    pub splits: Vec<PaceSplit>,
}

/// Time-of-day bucket used to derive a session title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket an hour-of-day (0..=23).
    /// Morning: 05:00-11:59, Afternoon: 12:00-16:59,
    /// Evening: 17:00-20:59, Night: 21:00-04:59.
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Bucket a timestamp in the given timezone.
    #[must_use]
    pub fn from_instant<Tz: chrono::TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_hour(instant.hour())
    }

    /// Display label, used as the run session title.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning run",
            Self::Afternoon => "Afternoon run",
            Self::Evening => "Evening run",
            Self::Night => "Night run",
        }
    }
}
