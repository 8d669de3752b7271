//! Metrics engine: pure computations over in-memory sample sequences.
//!
//! No I/O and no state. Malformed or sparse input degrades to empty results
//! rather than failing.

pub mod pace;
pub mod splits;

pub use pace::{average_pace, speed_to_pace, to_pace_samples};
pub use splits::compute_splits;
