// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use pressurelog_data::repository::tests::MockReadingRepository;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::reading::Reading;
use crate::services::classification::categorize_reading;
use crate::services::reading::ReadingService;

/// Create a reading service backed by an empty mock repository
pub fn mock_reading_service() -> ReadingService<MockReadingRepository> {
    ReadingService::new(MockReadingRepository::new())
}

/// Build a valid reading directly, bypassing the service, for seeding tests.
/// The category is still derived so the entity invariant holds.
pub fn test_reading(
    user_id: Uuid,
    systolic: i32,
    diastolic: i32,
    pulse: i32,
    timestamp: DateTime<Utc>,
) -> Reading {
    Reading {
        id: Uuid::new_v4(),
        user_id,
        systolic,
        diastolic,
        pulse,
        category: categorize_reading(systolic, diastolic),
        notes: None,
        timestamp,
        created_at: timestamp,
        updated_at: timestamp,
    }
}
