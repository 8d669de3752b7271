//! Wire DTOs for the remote run endpoint.
//!
//! Field names and shapes are part of the server contract and must not
//! change: requests use snake_case keys with ISO-8601 UTC instants, and
//! responses arrive wrapped in a `data` envelope.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::run::{RunDetail, RunSession};

fn iso_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// One heart-rate sample inside a run upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateSampleUpload {
    pub timestamp: String,
    pub bpm: i64,
}

/// One pace split inside a run upload. `partial_distance_km` is present only
/// when `is_partial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceSplitUpload {
    pub kilometer_number: u32,
    pub split_time_seconds: i64,
    pub pace_seconds_per_km: i64,
    pub is_partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_distance_km: Option<f64>,
}

/// A single run record submitted to `POST /runs/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunUpload {
    pub start_time: String,
    pub end_time: String,
    pub distance_km: f64,
    pub duration_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace_seconds_per_km: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_samples: Option<Vec<HeartRateSampleUpload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_splits: Option<Vec<PaceSplitUpload>>,
}

impl RunUpload {
    /// Full upload record including samples, splits, and steps.
    #[must_use]
    pub fn from_detail(detail: &RunDetail) -> Self {
        let heart_rate_samples: Vec<HeartRateSampleUpload> = detail
            .heart_rate_samples
            .iter()
            .map(|sample| HeartRateSampleUpload {
                timestamp: iso_instant(&sample.timestamp),
                bpm: sample.bpm,
            })
            .collect();

        let pace_splits: Vec<PaceSplitUpload> = detail
            .splits
            .iter()
            .map(|split| PaceSplitUpload {
                kilometer_number: split.kilometer_number,
                split_time_seconds: split.split_duration.num_seconds(),
                pace_seconds_per_km: split.split_pace_seconds_per_km as i64,
                is_partial: split.is_partial,
                partial_distance_km: split
                    .is_partial
                    .then_some(split.distance_meters / 1000.0),
            })
            .collect();

        Self {
            steps: Some(detail.total_steps),
            heart_rate_samples: (!heart_rate_samples.is_empty()).then_some(heart_rate_samples),
            pace_splits: (!pace_splits.is_empty()).then_some(pace_splits),
            ..Self::from_session(&detail.session)
        }
    }

    /// Minimal upload record carrying session-level aggregates only. Used as
    /// the fallback when detail enrichment fails.
    #[must_use]
    pub fn from_session(session: &RunSession) -> Self {
        Self {
            start_time: iso_instant(&session.start_time),
            end_time: iso_instant(&session.end_time),
            distance_km: session.distance_meters / 1000.0,
            duration_seconds: session.active_duration.num_seconds(),
            steps: None,
            avg_heart_rate: session.average_heart_rate_bpm,
            avg_pace_seconds_per_km: session.average_pace_seconds_per_km.map(|pace| pace as i64),
            heart_rate_samples: None,
            pace_splits: None,
        }
    }
}

/// Body of `POST /runs/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRunRequest {
    pub runs: Vec<RunUpload>,
}

/// Standard `{ "data": ... }` response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Per-item verdict in a batch response. `index` refers positionally to the
/// submitted `runs` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResultItem {
    pub index: usize,
    pub status: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub already_synced: Option<bool>,
}

/// Aggregate outcome of a batch upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRunData {
    #[serde(default)]
    pub created: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub results: Vec<BatchResultItem>,
}

/// One run in a `GET /runs` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: i64,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub distance_km: f64,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub avg_heart_rate: Option<i64>,
    #[serde(default)]
    pub avg_pace_seconds_per_km: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub already_synced: Option<bool>,
}

/// Pagination metadata on listing responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u32,
}

/// Pagination links on listing responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Paginated `{ data, meta?, links? }` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<PageMeta>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}
