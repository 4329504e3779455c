//! Literal constants shared across the booking flows.

/// Lifecycle status every booking is created with. All later transitions are
/// owned by the external store.
pub const PENDING_STATUS: &str = "pending";

/// Fallback message shown when a persistence failure carries no usable
/// message of its own.
pub const GENERIC_SUBMISSION_FAILURE: &str = "Please check your information and try again.";

/// Default map center for the live roster view (New Delhi).
pub const DEFAULT_MAP_CENTER: (f64, f64) = (28.6139, 77.209);
