use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage model for a blood pressure reading.
///
/// The category is stored as its display label; the domain layer owns the
/// enum and recomputes it on every mutation, so this record never carries a
/// stale value as long as writes go through the domain service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReading {
    /// Unique identifier for the reading
    pub id: Uuid,

    /// Owning user; a reading belongs to exactly one user
    pub user_id: Uuid,

    /// Systolic blood pressure in mmHg (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg (the lower number)
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Derived category label (e.g. "Normal", "Stage 1")
    pub category: String,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was taken (clinical time, UTC)
    pub timestamp: DateTime<Utc>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

/// Filter options for querying a user's readings
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    /// Only include readings taken at or after this instant
    pub since: Option<DateTime<Utc>>,

    /// Only include readings with this category label
    pub category: Option<String>,

    /// Maximum number of readings to return
    pub limit: Option<usize>,

    /// Number of readings to skip before the first returned one
    pub offset: Option<usize>,

    /// Sort newest-first when true (the default), oldest-first when false
    pub sort_desc: Option<bool>,
}
