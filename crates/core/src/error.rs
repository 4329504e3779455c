use crate::validation::Violations;

/// Failure reported by the external data/identity service.
///
/// The service is a black box: the only distinction this application cares
/// about is whether the call never completed or completed with a refusal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("data service unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Rejected(String),
}

/// Everything that can interrupt a booking flow.
///
/// None of these are fatal: every variant returns the user to an interactive
/// idle state (edit and resubmit, sign in, or pick another ward).
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Client-side validation refused the form; no persistence call was made.
    #[error("{0}")]
    Validation(Violations),
    /// No authenticated identity; the view must not render and the caller is
    /// redirected to sign-in.
    #[error("authentication required")]
    AuthRequired,
    /// The availability gate refused a ward with zero remaining beds.
    #[error("{ward_name} has no available beds at the moment")]
    WardFull { ward_name: String },
    /// A prior submission on this view is still persisting.
    #[error("a booking submission is already in progress")]
    SubmissionInFlight,
    /// Submit was called before a ward was selected.
    #[error("Missing required information")]
    NoWardSelected,
    /// The insert call failed; carries the underlying message or the generic
    /// fallback. Recoverable by resubmission, never retried automatically.
    #[error("{0}")]
    Persistence(String),
    /// A snapshot or identity read against the external store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;
