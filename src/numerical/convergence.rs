//! Stopping rule shared by every root finder.
//!
//! Successive iterates are compared by their relative change `|current - previous| / |current|`.
//! An iterate that is exactly zero counts as converged, since it is an exact root candidate
//! and the relative change is undefined there.

/// relative change between two successive iterates; 0 when `current` is exactly zero
pub fn relative_error(previous: f64, current: f64) -> f64 {
    if current == 0.0 {
        0.0
    } else {
        ((current - previous) / current).abs()
    }
}

/// true when the relative change from `previous` to `current` is below `tolerance`.
/// NaN iterates never converge.
pub fn converged(previous: f64, current: f64, tolerance: f64) -> bool {
    relative_error(previous, current) < tolerance
}
