// Form Boundary - Shape Validation
// Raw form input is parsed and validated exactly once, here. Everything
// downstream (store, aggregation) receives well-typed, already-valid records.

use crate::entities::{Contribution, Traveler, Trip};
use chrono::{DateTime, NaiveDate};

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Parse a user-supplied amount. Fails loudly on anything that is not a
/// finite number - text amounts are never silently coerced or truncated.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Amount is empty".to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("Amount is not a finite number: '{}'", trimmed)),
        Err(_) => Err(format!("Amount is not a number: '{}'", trimmed)),
    }
}

/// Parse a calendar date. Accepts bare ISO dates (YYYY-MM-DD) and RFC 3339
/// timestamps. A timestamp contributes only its calendar date, taken in the
/// string's own offset - never normalized through UTC, so a date can never
/// shift by a day under time-zone conversion.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    Err(format!("Not a valid date: '{}'", trimmed))
}

// ============================================================================
// TRIP FORM
// ============================================================================

/// Raw trip form fields, exactly as submitted. Empty string = field left blank.
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    pub name: String,
    pub destination: String,
    pub currency: String,
    pub target_amount: String,
    pub trip_date: String,
}

/// Validated trip fields, ready to build or update a Trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripFields {
    pub name: String,
    pub destination: String,
    pub currency: String,
    pub target_amount: Option<f64>,
    pub trip_date: Option<NaiveDate>,
}

impl TripForm {
    pub fn validate(&self) -> ValidationResult<TripFields> {
        let context = "TripForm";
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(context, "name", "Required field is empty"));
        }

        let destination = self.destination.trim();
        if destination.is_empty() {
            errors.push(ValidationError::new(
                context,
                "destination",
                "Required field is empty",
            ));
        }

        let currency = self.currency.trim();
        if currency.is_empty() {
            errors.push(ValidationError::new(context, "currency", "Required field is empty"));
        }

        // Blank target means "no goal"
        let target_amount = if self.target_amount.trim().is_empty() {
            None
        } else {
            match parse_amount(&self.target_amount) {
                Ok(value) if value >= 0.0 => Some(value),
                Ok(value) => {
                    errors.push(ValidationError::new(
                        context,
                        "target_amount",
                        format!("Must be non-negative, got {}", value),
                    ));
                    None
                }
                Err(msg) => {
                    errors.push(ValidationError::new(context, "target_amount", msg));
                    None
                }
            }
        };

        let trip_date = if self.trip_date.trim().is_empty() {
            None
        } else {
            match parse_calendar_date(&self.trip_date) {
                Ok(date) => Some(date),
                Err(msg) => {
                    errors.push(ValidationError::new(context, "trip_date", msg));
                    None
                }
            }
        };

        if errors.is_empty() {
            Ok(TripFields {
                name: name.to_string(),
                destination: destination.to_string(),
                currency: currency.to_string(),
                target_amount,
                trip_date,
            })
        } else {
            Err(errors)
        }
    }

    /// Validate and build a brand-new Trip.
    pub fn build(&self) -> ValidationResult<Trip> {
        let fields = self.validate()?;
        Ok(Trip::new(
            fields.name,
            fields.destination,
            fields.currency,
            fields.target_amount,
            fields.trip_date,
        ))
    }
}

impl TripFields {
    /// Apply validated fields onto an existing Trip, preserving identity.
    pub fn apply_to(self, trip: &mut Trip) {
        trip.name = self.name;
        trip.destination = self.destination;
        trip.currency = self.currency;
        trip.target_amount = self.target_amount;
        trip.trip_date = self.trip_date;
    }
}

// ============================================================================
// TRAVELER FORM
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TravelerForm {
    pub name: String,
}

impl TravelerForm {
    pub fn build(&self, trip_id: &str) -> ValidationResult<Traveler> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(vec![ValidationError::new(
                "TravelerForm",
                "name",
                "Required field is empty",
            )]);
        }
        Ok(Traveler::new(trip_id.to_string(), name.to_string()))
    }
}

// ============================================================================
// CONTRIBUTION FORM
// ============================================================================

/// Raw contribution form fields. `travelers` at validation time is the
/// trip's traveler list; the selected id must belong to it.
#[derive(Debug, Clone, Default)]
pub struct ContributionForm {
    pub traveler_id: String,
    pub amount: String,
    pub date: String,
    pub note: String,
}

/// Validated contribution fields, ready to build or update a Contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionFields {
    pub traveler_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl ContributionForm {
    pub fn validate(&self, travelers: &[Traveler]) -> ValidationResult<ContributionFields> {
        let context = "ContributionForm";
        let mut errors = Vec::new();

        let traveler_id = self.traveler_id.trim();
        if traveler_id.is_empty() {
            errors.push(ValidationError::new(
                context,
                "traveler_id",
                "A traveler must be selected",
            ));
        } else if !travelers.iter().any(|t| t.id == traveler_id) {
            errors.push(ValidationError::new(
                context,
                "traveler_id",
                format!("No traveler with id '{}' on this trip", traveler_id),
            ));
        }

        let amount = match parse_amount(&self.amount) {
            Ok(value) if value > 0.0 => Some(value),
            Ok(value) => {
                errors.push(ValidationError::new(
                    context,
                    "amount",
                    format!("Must be positive, got {}", value),
                ));
                None
            }
            Err(msg) => {
                errors.push(ValidationError::new(context, "amount", msg));
                None
            }
        };

        let date = match parse_calendar_date(&self.date) {
            Ok(date) => Some(date),
            Err(msg) => {
                errors.push(ValidationError::new(context, "date", msg));
                None
            }
        };

        let note = self.note.trim();
        let note = if note.is_empty() {
            None
        } else {
            Some(note.to_string())
        };

        match (amount, date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(ContributionFields {
                traveler_id: traveler_id.to_string(),
                amount,
                date,
                note,
            }),
            _ => Err(errors),
        }
    }

    /// Validate and build a brand-new Contribution for the trip.
    pub fn build(&self, trip_id: &str, travelers: &[Traveler]) -> ValidationResult<Contribution> {
        let fields = self.validate(travelers)?;
        Ok(Contribution::new(
            trip_id.to_string(),
            fields.traveler_id,
            fields.amount,
            fields.date,
            fields.note,
        ))
    }
}

impl ContributionFields {
    /// Apply validated fields onto an existing Contribution, preserving identity.
    pub fn apply_to(self, contribution: &mut Contribution) {
        contribution.traveler_id = self.traveler_id;
        contribution.amount = self.amount;
        contribution.date = self.date;
        contribution.note = self.note;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn travelers() -> Vec<Traveler> {
        vec![
            Traveler::new("trip-1".to_string(), "Ana".to_string()),
            Traveler::new("trip-1".to_string(), "Bruno".to_string()),
        ]
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("200000").is_ok());
        assert!(parse_amount(" 1500.50 ").is_ok());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12abc").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn test_parse_calendar_date_bare_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(parse_calendar_date("2025-03-10").unwrap(), expected);

        // A timestamp contributes the calendar date in its own offset;
        // 23:30 at -05:00 stays March 10, not March 11 UTC.
        assert_eq!(
            parse_calendar_date("2025-03-10T23:30:00-05:00").unwrap(),
            expected
        );

        assert!(parse_calendar_date("10/03/2025").is_err());
    }

    #[test]
    fn test_trip_form_requires_name_and_destination() {
        let form = TripForm {
            currency: "COP".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"destination"));
    }

    #[test]
    fn test_trip_form_blank_target_means_no_goal() {
        let form = TripForm {
            name: "Viaje a Cartagena".to_string(),
            destination: "Cartagena".to_string(),
            currency: "COP".to_string(),
            target_amount: "".to_string(),
            trip_date: "".to_string(),
        };
        let fields = form.validate().unwrap();
        assert_eq!(fields.target_amount, None);
        assert_eq!(fields.trip_date, None);
    }

    #[test]
    fn test_trip_form_rejects_negative_target() {
        let form = TripForm {
            name: "Viaje".to_string(),
            destination: "Cartagena".to_string(),
            currency: "COP".to_string(),
            target_amount: "-5".to_string(),
            trip_date: "".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "target_amount");
    }

    #[test]
    fn test_contribution_form_rejects_non_positive_amount() {
        let travelers = travelers();
        let form = ContributionForm {
            traveler_id: travelers[0].id.clone(),
            amount: "0".to_string(),
            date: "2025-03-10".to_string(),
            note: String::new(),
        };
        let errors = form.validate(&travelers).unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_contribution_form_rejects_unknown_traveler() {
        let travelers = travelers();
        let form = ContributionForm {
            traveler_id: "nobody".to_string(),
            amount: "200000".to_string(),
            date: "2025-03-10".to_string(),
            note: String::new(),
        };
        let errors = form.validate(&travelers).unwrap_err();
        assert_eq!(errors[0].field, "traveler_id");
    }

    #[test]
    fn test_contribution_form_builds_with_trimmed_note() {
        let travelers = travelers();
        let form = ContributionForm {
            traveler_id: travelers[1].id.clone(),
            amount: "200000".to_string(),
            date: "2025-03-10".to_string(),
            note: "  Pago cuota 1  ".to_string(),
        };
        let contribution = form.build("trip-1", &travelers).unwrap();
        assert_eq!(contribution.trip_id, "trip-1");
        assert_eq!(contribution.amount, 200_000.0);
        assert_eq!(contribution.note.as_deref(), Some("Pago cuota 1"));
    }
}
