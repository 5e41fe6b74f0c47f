//! Run and sweep-point identifier helpers.

use chrono::Utc;
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// Generate a fresh run identifier: `run-<utc timestamp>-<random suffix>`.
///
/// The timestamp keeps result directories sortable; the suffix keeps two
/// runs started within the same second distinct.
#[must_use]
pub fn new_run_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("run-{}-{suffix}", Utc::now().format("%Y%m%d-%H%M%S"))
}

/// Sweep-point identifier for the `index`-th point of a sweep, in the
/// composer's deterministic expansion order.
#[must_use]
pub fn sweep_point_id(index: usize) -> String {
    format!("point-{index:03}")
}
