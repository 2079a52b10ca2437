//! Per-kind payload schema validation.
//!
//! # Responsibilities
//! - Enforce field presence, length limits, and identifier charset
//! - Collect every violation, not just the first
//!
//! Each operation kind has its own required-field set; limits mirror
//! what the registration and tracking forms accept.

use crate::tx::request::Payload;

/// Maximum lengths per field.
const MAX_ID_LEN: usize = 64;
const MAX_NAME_LEN: usize = 128;
const MAX_ORIGIN_LEN: usize = 256;
const MAX_DESCRIPTION_LEN: usize = 2048;
const MAX_CATEGORY_LEN: usize = 64;
const MAX_LOCATION_LEN: usize = 256;
const MAX_NOTES_LEN: usize = 1024;

/// A single violated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Payload validation failure carrying every violated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "payload validation failed: ")?;
        for (i, err) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Whether `s` is a valid product identifier: non-empty, bounded, and
/// restricted to `[A-Za-z0-9_-]` so it stays URL-path-safe.
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_ID_LEN
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validate a payload against the schema for its operation kind.
pub fn validate(payload: &Payload) -> Result<(), ValidationError> {
    let mut fields = Vec::new();

    match payload {
        Payload::RegisterProduct {
            id,
            name,
            origin,
            description,
            category,
        } => {
            check_identifier(&mut fields, "id", id);
            check_required(&mut fields, "name", name, MAX_NAME_LEN);
            check_required(&mut fields, "origin", origin, MAX_ORIGIN_LEN);
            check_optional(&mut fields, "description", description.as_deref(), MAX_DESCRIPTION_LEN);
            check_required(&mut fields, "category", category, MAX_CATEGORY_LEN);
        }
        Payload::LogEvent {
            product_id,
            event_type,
            location,
            notes,
        } => {
            check_identifier(&mut fields, "product_id", product_id);
            if *event_type == crate::tx::request::EventType::Registered {
                fields.push(FieldError {
                    field: "event_type",
                    message: "REGISTERED is reserved for product registration".to_string(),
                });
            }
            check_required(&mut fields, "location", location, MAX_LOCATION_LEN);
            check_optional(&mut fields, "notes", notes.as_deref(), MAX_NOTES_LEN);
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

fn check_identifier(fields: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.is_empty() {
        fields.push(FieldError {
            field,
            message: "is required".to_string(),
        });
    } else if value.len() > MAX_ID_LEN {
        fields.push(FieldError {
            field,
            message: format!("exceeds maximum length of {MAX_ID_LEN}"),
        });
    } else if !is_valid_identifier(value) {
        fields.push(FieldError {
            field,
            message: "only alphanumeric, dashes, and underscores allowed".to_string(),
        });
    }
}

fn check_required(fields: &mut Vec<FieldError>, field: &'static str, value: &str, max: usize) {
    if value.trim().is_empty() {
        fields.push(FieldError {
            field,
            message: "is required".to_string(),
        });
    } else if value.len() > max {
        fields.push(FieldError {
            field,
            message: format!("exceeds maximum length of {max}"),
        });
    }
}

fn check_optional(fields: &mut Vec<FieldError>, field: &'static str, value: Option<&str>, max: usize) {
    if let Some(v) = value {
        if v.len() > max {
            fields.push(FieldError {
                field,
                message: format!("exceeds maximum length of {max}"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::request::EventType;

    #[test]
    fn test_valid_registration_passes() {
        let payload = Payload::RegisterProduct {
            id: "PRD-1001-XYZ".into(),
            name: "Single-Origin Coffee".into(),
            origin: "Huila, Colombia".into(),
            description: None,
            category: "coffee".into(),
        };
        assert!(validate(&payload).is_ok());
    }

    #[test]
    fn test_every_violated_field_is_reported() {
        let payload = Payload::RegisterProduct {
            id: "not a valid id!".into(),
            name: String::new(),
            origin: String::new(),
            description: Some("x".repeat(MAX_DESCRIPTION_LEN + 1)),
            category: String::new(),
        };
        let err = validate(&payload).unwrap_err();
        let violated: Vec<&str> = err.fields.iter().map(|f| f.field).collect();
        assert_eq!(violated, vec!["id", "name", "origin", "description", "category"]);
    }

    #[test]
    fn test_event_requires_product_id_and_location() {
        let payload = Payload::LogEvent {
            product_id: String::new(),
            event_type: EventType::Ship,
            location: "   ".into(),
            notes: None,
        };
        let err = validate(&payload).unwrap_err();
        assert_eq!(err.fields.len(), 2);
        assert_eq!(err.fields[0].field, "product_id");
        assert_eq!(err.fields[1].field, "location");
    }

    #[test]
    fn test_reserved_event_type_rejected() {
        let payload = Payload::LogEvent {
            product_id: "PRD-1".into(),
            event_type: EventType::Registered,
            location: "origin farm".into(),
            notes: None,
        };
        let err = validate(&payload).unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].field, "event_type");
    }

    #[test]
    fn test_identifier_charset() {
        assert!(is_valid_identifier("PRD-1001_XYZ"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("prd/1001"));
        assert!(!is_valid_identifier("prd 1001"));
        assert!(!is_valid_identifier(&"a".repeat(65)));
    }

    #[test]
    fn test_error_display_lists_all_fields() {
        let payload = Payload::LogEvent {
            product_id: String::new(),
            event_type: EventType::Harvest,
            location: String::new(),
            notes: None,
        };
        let msg = validate(&payload).unwrap_err().to_string();
        assert!(msg.contains("product_id"));
        assert!(msg.contains("location"));
    }
}
