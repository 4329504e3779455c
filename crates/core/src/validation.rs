//! Client-side form validation for the two booking flows.
//!
//! Validation is synchronous, pure and deterministic, and always runs before
//! any persistence attempt. A form validates into its `Validated*` record or
//! into an ordered [`Violations`] list; the first violation is what the user
//! sees, verbatim.

use serde::{Deserialize, Serialize};

/// One field-level rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Record field the rule applies to, e.g. `patient_phone`.
    pub field: &'static str,
    /// User-facing message, surfaced verbatim.
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered list of field-level violations. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    /// The violation that short-circuits submission.
    pub fn first(&self) -> &FieldViolation {
        // Construction via `check` guarantees at least one entry.
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&violation.message)?;
        }
        Ok(())
    }
}

/// Collects violations in field order while checks run.
#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    /// Required text with length bounds in characters. `required_message` is
    /// used for the too-short case so the user sees the form's own wording.
    fn required_text(
        &mut self,
        field: &'static str,
        value: &str,
        min: usize,
        max: usize,
        required_message: &str,
    ) {
        let len = value.chars().count();
        if len < min {
            self.violations.push(FieldViolation {
                field,
                message: required_message.to_owned(),
            });
        } else if len > max {
            self.violations.push(FieldViolation {
                field,
                message: format!("{field} must be at most {max} characters"),
            });
        }
    }

    /// Optional text with an upper bound only. Empty input normalizes to
    /// `None`, matching the original forms which submit `null` for blanks.
    fn optional_text(&mut self, field: &'static str, value: String, max: usize) -> Option<String> {
        if value.is_empty() {
            return None;
        }
        if value.chars().count() > max {
            self.violations.push(FieldViolation {
                field,
                message: format!("{field} must be at most {max} characters"),
            });
        }
        Some(value)
    }

    fn bounded_number(&mut self, field: &'static str, value: u32, max: u32, message: &str) {
        if value > max {
            self.violations.push(FieldViolation {
                field,
                message: message.to_owned(),
            });
        }
    }

    fn finish<T>(self, ok: impl FnOnce() -> T) -> Result<T, Violations> {
        if self.violations.is_empty() {
            Ok(ok())
        } else {
            Err(Violations(self.violations))
        }
    }
}

/// Proposed field values for an ambulance booking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmbulanceBookingForm {
    pub patient_name: String,
    pub patient_phone: String,
    pub pickup_address: String,
    pub destination_address: String,
    pub emergency_type: String,
}

/// An ambulance booking form that passed all field rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAmbulanceBooking {
    pub patient_name: String,
    pub patient_phone: String,
    pub pickup_address: String,
    pub destination_address: String,
    pub emergency_type: String,
}

impl AmbulanceBookingForm {
    /// Rules: name 1..=100, phone 10..=15, addresses 5..=200, emergency
    /// type 3..=100 characters.
    pub fn validate(self) -> Result<ValidatedAmbulanceBooking, Violations> {
        let mut check = Checker::default();
        check.required_text(
            "patient_name",
            &self.patient_name,
            1,
            100,
            "Patient name is required",
        );
        check.required_text(
            "patient_phone",
            &self.patient_phone,
            10,
            15,
            "Valid phone number required",
        );
        check.required_text(
            "pickup_address",
            &self.pickup_address,
            5,
            200,
            "Pickup address is required",
        );
        check.required_text(
            "destination_address",
            &self.destination_address,
            5,
            200,
            "Destination address is required",
        );
        check.required_text(
            "emergency_type",
            &self.emergency_type,
            3,
            100,
            "Emergency type is required",
        );

        check.finish(|| ValidatedAmbulanceBooking {
            patient_name: self.patient_name,
            patient_phone: self.patient_phone,
            pickup_address: self.pickup_address,
            destination_address: self.destination_address,
            emergency_type: self.emergency_type,
        })
    }
}

/// Proposed field values for a ward booking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WardBookingForm {
    pub patient_name: String,
    pub patient_age: u32,
    pub patient_phone: String,
    pub admission_date: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub medical_condition: String,
    #[serde(default)]
    pub special_requirements: String,
}

/// A ward booking form that passed all field rules, with blank optionals
/// normalized away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWardBooking {
    pub patient_name: String,
    pub patient_age: u32,
    pub patient_phone: String,
    pub admission_date: String,
    pub doctor_name: Option<String>,
    pub medical_condition: Option<String>,
    pub special_requirements: Option<String>,
}

impl WardBookingForm {
    /// Rules: name 1..=100, age 0..=150, phone 10..=15, admission date
    /// non-empty, doctor ..=100, free-text optionals ..=500 characters.
    pub fn validate(self) -> Result<ValidatedWardBooking, Violations> {
        let mut check = Checker::default();
        check.required_text(
            "patient_name",
            &self.patient_name,
            1,
            100,
            "Patient name is required",
        );
        check.bounded_number("patient_age", self.patient_age, 150, "Valid age required");
        check.required_text(
            "patient_phone",
            &self.patient_phone,
            10,
            15,
            "Valid phone number required",
        );
        check.required_text(
            "admission_date",
            &self.admission_date,
            1,
            usize::MAX,
            "Admission date is required",
        );
        let doctor_name = check.optional_text("doctor_name", self.doctor_name, 100);
        let medical_condition = check.optional_text("medical_condition", self.medical_condition, 500);
        let special_requirements =
            check.optional_text("special_requirements", self.special_requirements, 500);

        check.finish(|| ValidatedWardBooking {
            patient_name: self.patient_name,
            patient_age: self.patient_age,
            patient_phone: self.patient_phone,
            admission_date: self.admission_date,
            doctor_name,
            medical_condition,
            special_requirements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambulance_form() -> AmbulanceBookingForm {
        AmbulanceBookingForm {
            patient_name: "Jane Doe".into(),
            patient_phone: "9999999999".into(),
            pickup_address: "12 Elm St, city".into(),
            destination_address: "City Hospital".into(),
            emergency_type: "Cardiac Emergency".into(),
        }
    }

    fn ward_form() -> WardBookingForm {
        WardBookingForm {
            patient_name: "Jane Doe".into(),
            patient_age: 42,
            patient_phone: "9999999999".into(),
            admission_date: "2026-09-01".into(),
            doctor_name: String::new(),
            medical_condition: String::new(),
            special_requirements: String::new(),
        }
    }

    #[test]
    fn valid_ambulance_form_passes() {
        let valid = ambulance_form().validate().unwrap();
        assert_eq!(valid.patient_name, "Jane Doe");
        assert_eq!(valid.emergency_type, "Cardiac Emergency");
    }

    #[test]
    fn empty_name_surfaces_the_form_wording() {
        let mut form = ambulance_form();
        form.patient_name = String::new();
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.first().field, "patient_name");
        assert_eq!(violations.first().message, "Patient name is required");
    }

    #[test]
    fn violations_keep_field_order() {
        let form = AmbulanceBookingForm::default();
        let violations = form.validate().unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            [
                "patient_name",
                "patient_phone",
                "pickup_address",
                "destination_address",
                "emergency_type",
            ]
        );
    }

    #[test]
    fn phone_bounds_are_ten_to_fifteen() {
        let mut form = ambulance_form();
        form.patient_phone = "123456789".into();
        assert!(form.clone().validate().is_err());

        form.patient_phone = "1234567890".into();
        assert!(form.clone().validate().is_ok());

        form.patient_phone = "1".repeat(16);
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.first().field, "patient_phone");
    }

    #[test]
    fn short_addresses_are_rejected() {
        let mut form = ambulance_form();
        form.pickup_address = "abcd".into();
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.first().message, "Pickup address is required");
    }

    #[test]
    fn name_over_one_hundred_characters_is_rejected() {
        let mut form = ambulance_form();
        form.patient_name = "x".repeat(101);
        let violations = form.validate().unwrap_err();
        assert_eq!(
            violations.first().message,
            "patient_name must be at most 100 characters"
        );
    }

    #[test]
    fn valid_ward_form_normalizes_blank_optionals() {
        let valid = ward_form().validate().unwrap();
        assert_eq!(valid.doctor_name, None);
        assert_eq!(valid.medical_condition, None);
        assert_eq!(valid.special_requirements, None);
    }

    #[test]
    fn ward_optionals_are_kept_when_present() {
        let mut form = ward_form();
        form.doctor_name = "Dr. Mehta".into();
        form.medical_condition = "Pneumonia".into();
        let valid = form.validate().unwrap();
        assert_eq!(valid.doctor_name.as_deref(), Some("Dr. Mehta"));
        assert_eq!(valid.medical_condition.as_deref(), Some("Pneumonia"));
    }

    #[test]
    fn age_above_one_hundred_fifty_is_rejected() {
        let mut form = ward_form();
        form.patient_age = 151;
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.first().message, "Valid age required");
    }

    #[test]
    fn missing_admission_date_is_rejected() {
        let mut form = ward_form();
        form.admission_date = String::new();
        let violations = form.validate().unwrap_err();
        assert_eq!(violations.first().message, "Admission date is required");
    }

    #[test]
    fn overlong_free_text_optional_is_rejected() {
        let mut form = ward_form();
        form.special_requirements = "y".repeat(501);
        let violations = form.validate().unwrap_err();
        assert_eq!(
            violations.first().message,
            "special_requirements must be at most 500 characters"
        );
    }
}
