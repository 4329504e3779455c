//! Identity gate for booking views.

use carebook_types::Identity;

use crate::error::{BookingError, BookingResult};
use crate::store::DataStore;

/// Queries the current authenticated identity at view activation.
///
/// With no identity present the view must not render its form; the caller
/// surfaces [`BookingError::AuthRequired`] and redirects to sign-in. The
/// returned identity is retained by the view and attached to every booking
/// it creates. This runs once per activation; submissions within the view's
/// lifetime accept the staleness window.
pub async fn require_identity(store: &dyn DataStore) -> BookingResult<Identity> {
    match store.current_user().await? {
        Some(identity) => Ok(identity),
        None => {
            tracing::info!("booking view refused: no authenticated identity");
            Err(BookingError::AuthRequired)
        }
    }
}
