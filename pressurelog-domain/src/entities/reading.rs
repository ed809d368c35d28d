use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::entities::category::{CategoryInfo, ReadingCategory};
use crate::services::classification::categorize_reading;
use crate::services::validation::validate_reading_values;

/// One or more physiological constraints were violated.
/// Carries the full ordered list of human-readable messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid reading values: {}", errors.join(", "))]
pub struct InvalidReading {
    /// Accumulated violation messages, in fixed constraint order
    pub errors: Vec<String>,
}

/// Domain entity for a blood pressure reading.
///
/// Readings are only constructed through [`Reading::create`] and only mutated
/// through [`Reading::apply_update`]; both paths validate the measurements and
/// recompute the category, so a persisted reading never carries a stale or
/// invalid category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Unique identifier for the reading
    pub id: Uuid,

    /// Owning user; not reassignable after creation
    pub user_id: Uuid,

    /// Systolic blood pressure in mmHg (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg (the lower number)
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Derived category; always recomputed from systolic/diastolic
    pub category: ReadingCategory,

    /// Optional notes, trimmed; empty strings are normalized to absent
    pub notes: Option<String>,

    /// When the reading was taken (clinical time, UTC)
    pub timestamp: DateTime<Utc>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new blood pressure reading.
///
/// Measurements are accepted as general numeric input; values that pass
/// validation are stored as whole mmHg / BPM units.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReadingRequest {
    /// Systolic blood pressure (the higher number)
    pub systolic: f64,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: f64,

    /// Pulse rate in beats per minute
    pub pulse: f64,

    /// Optional notes about the reading
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// When the reading was taken. Defaults to current time if not provided.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Request payload for a partial update of an existing reading.
/// Absent fields keep their prior values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateReadingRequest {
    /// New systolic blood pressure
    pub systolic: Option<f64>,

    /// New diastolic blood pressure
    pub diastolic: Option<f64>,

    /// New pulse rate
    pub pulse: Option<f64>,

    /// New notes text
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// New clinical timestamp
    pub timestamp: Option<DateTime<Utc>>,
}

impl Reading {
    /// Create a new reading with validation.
    ///
    /// Fails with [`InvalidReading`] when any physiological constraint is
    /// violated; no entity is constructed in that case.
    pub fn create(user_id: Uuid, request: &CreateReadingRequest) -> Result<Reading, InvalidReading> {
        let errors = validate_reading_values(request.systolic, request.diastolic, request.pulse);
        if !errors.is_empty() {
            return Err(InvalidReading { errors });
        }

        let now = Utc::now();
        let systolic = request.systolic as i32;
        let diastolic = request.diastolic as i32;

        Ok(Reading {
            id: Uuid::new_v4(),
            user_id,
            systolic,
            diastolic,
            pulse: request.pulse as i32,
            category: categorize_reading(systolic, diastolic),
            notes: normalize_notes(request.notes.as_deref()),
            timestamp: request.timestamp.unwrap_or(now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, returning the updated reading.
    ///
    /// The combined values are re-validated before anything is applied, so on
    /// failure `self` is untouched and no partially-updated state exists. On
    /// success the category is recomputed and `updated_at` refreshed.
    pub fn apply_update(&self, request: &UpdateReadingRequest) -> Result<Reading, InvalidReading> {
        let systolic = request.systolic.unwrap_or(self.systolic as f64);
        let diastolic = request.diastolic.unwrap_or(self.diastolic as f64);
        let pulse = request.pulse.unwrap_or(self.pulse as f64);

        let errors = validate_reading_values(systolic, diastolic, pulse);
        if !errors.is_empty() {
            return Err(InvalidReading { errors });
        }

        let systolic = systolic as i32;
        let diastolic = diastolic as i32;

        Ok(Reading {
            systolic,
            diastolic,
            pulse: pulse as i32,
            category: categorize_reading(systolic, diastolic),
            notes: match &request.notes {
                Some(notes) => normalize_notes(Some(notes)),
                None => self.notes.clone(),
            },
            timestamp: request.timestamp.unwrap_or(self.timestamp),
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    /// Detailed information about this reading's category
    pub fn category_info(&self) -> &'static CategoryInfo {
        self.category.info()
    }

    /// Whether this reading indicates high risk (Stage 2 or Crisis)
    pub fn is_high_risk(&self) -> bool {
        self.category.is_high_risk()
    }
}

/// Trim surrounding whitespace and normalize empty notes to absent
fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned)
}
