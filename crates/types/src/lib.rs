//! Shared vocabulary types for the CareBook booking system.
//!
//! This crate holds the leaf types exchanged between the core booking logic
//! and the API surface: identifier newtypes, the closed classification enums
//! for ambulances, wards and bookings, and the navigation targets a flow can
//! resolve to. Nothing in here performs I/O.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a classification enum from its wire form.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    /// Human-readable name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

id_newtype!(
    /// Identifier of an authenticated user in the external identity service.
    UserId
);
id_newtype!(
    /// Identifier of an ambulance resource row.
    AmbulanceId
);
id_newtype!(
    /// Identifier of a hospital ward resource row.
    WardId
);
id_newtype!(
    /// Identifier of a booking request row (ambulance or ward).
    BookingId
);

/// An authenticated identity as reported by the external identity service.
///
/// Obtained once at view activation and attached to every booking the view
/// creates as its owning requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Service tier of an ambulance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbulanceType {
    /// Basic Life Support (BLS).
    #[default]
    Basic,
    /// Advanced Life Support (ALS).
    Advanced,
    /// Air ambulance.
    Air,
}

impl AmbulanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbulanceType::Basic => "basic",
            AmbulanceType::Advanced => "advanced",
            AmbulanceType::Air => "air",
        }
    }
}

impl std::fmt::Display for AmbulanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AmbulanceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(AmbulanceType::Basic),
            "advanced" => Ok(AmbulanceType::Advanced),
            "air" => Ok(AmbulanceType::Air),
            other => Err(UnknownVariant {
                kind: "ambulance type",
                value: other.to_owned(),
            }),
        }
    }
}

/// Operational status of an ambulance. Transitions are asserted by the
/// external store; this application only displays the latest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbulanceStatus {
    Available,
    OnDuty,
    Maintenance,
}

impl AmbulanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbulanceStatus::Available => "available",
            AmbulanceStatus::OnDuty => "on_duty",
            AmbulanceStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a hospital ward.
///
/// Deliberately *closed*: only known ward categories are accepted when
/// decoding external rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WardType {
    General,
    SemiPrivate,
    Private,
    Icu,
}

impl WardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WardType::General => "general",
            WardType::SemiPrivate => "semi_private",
            WardType::Private => "private",
            WardType::Icu => "icu",
        }
    }
}

impl std::fmt::Display for WardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WardType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(WardType::General),
            "semi_private" => Ok(WardType::SemiPrivate),
            "private" => Ok(WardType::Private),
            "icu" => Ok(WardType::Icu),
            other => Err(UnknownVariant {
                kind: "ward type",
                value: other.to_owned(),
            }),
        }
    }
}

/// Lifecycle status of a booking request.
///
/// This application only ever writes `Pending`; every later transition is
/// owned by the external store. Unrecognised values decode as `Unknown`
/// rather than failing the whole row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation target a completed or refused flow resolves to.
///
/// The surrounding shell owns the actual route table; flows only name the
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Dashboard,
    SignIn,
    AmbulanceBooking,
    AmbulanceTracking,
}

impl Route {
    /// Path understood by the shell's router.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::SignIn => "/login",
            Route::AmbulanceBooking => "/ambulance-booking",
            Route::AmbulanceTracking => "/ambulance-tracking",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn classification_enums_use_snake_case_wire_forms() {
        assert_eq!(
            serde_json::to_string(&AmbulanceStatus::OnDuty).unwrap(),
            "\"on_duty\""
        );
        assert_eq!(
            serde_json::from_str::<WardType>("\"semi_private\"").unwrap(),
            WardType::SemiPrivate
        );
        assert_eq!(
            serde_json::to_string(&BookingStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn unknown_booking_status_decodes_leniently() {
        let status: BookingStatus = serde_json::from_str("\"in_transit\"").unwrap();
        assert_eq!(status, BookingStatus::Unknown);
    }

    #[test]
    fn ambulance_type_round_trips_through_from_str() {
        for ty in [
            AmbulanceType::Basic,
            AmbulanceType::Advanced,
            AmbulanceType::Air,
        ] {
            assert_eq!(AmbulanceType::from_str(ty.as_str()).unwrap(), ty);
        }
        let err = AmbulanceType::from_str("boat").unwrap_err();
        assert!(err.to_string().contains("boat"));
    }

    #[test]
    fn id_newtypes_serialize_transparently() {
        let id = WardId::new("w-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"w-42\"");
        assert_eq!(id.to_string(), "w-42");
    }

    #[test]
    fn routes_map_to_shell_paths() {
        assert_eq!(Route::Dashboard.path(), "/dashboard");
        assert_eq!(Route::SignIn.path(), "/login");
        assert_eq!(Route::AmbulanceBooking.path(), "/ambulance-booking");
        assert_eq!(Route::AmbulanceTracking.path(), "/ambulance-tracking");
    }
}
