use crate::entities::reading::Reading;
use pressurelog_data::models::reading::StoredReading;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert from data model to domain entity for a blood pressure reading.
///
/// Fails if the stored category label is not one of the five fixed labels,
/// which would indicate a corrupted record.
pub fn convert_to_domain_reading(stored: StoredReading) -> Result<Reading, String> {
    let category = stored.category.parse()?;

    Ok(Reading {
        id: stored.id,
        user_id: stored.user_id,
        systolic: stored.systolic,
        diastolic: stored.diastolic,
        pulse: stored.pulse,
        category,
        notes: stored.notes,
        timestamp: stored.timestamp,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    })
}

/// Convert from domain entity to data model for a blood pressure reading
pub fn convert_to_data_reading(reading: &Reading) -> StoredReading {
    StoredReading {
        id: reading.id,
        user_id: reading.user_id,
        systolic: reading.systolic,
        diastolic: reading.diastolic,
        pulse: reading.pulse,
        category: reading.category.label().to_string(),
        notes: reading.notes.clone(),
        timestamp: reading.timestamp,
        created_at: reading.created_at,
        updated_at: reading.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::category::ReadingCategory;
    use crate::entities::reading::CreateReadingRequest;
    use uuid::Uuid;

    #[test]
    fn test_round_trip_preserves_category() {
        let request = CreateReadingRequest {
            systolic: 135.0,
            diastolic: 85.0,
            pulse: 74.0,
            notes: Some("evening".to_string()),
            timestamp: None,
        };
        let reading = Reading::create(Uuid::new_v4(), &request).unwrap();

        let stored = convert_to_data_reading(&reading);
        assert_eq!(stored.category, "Stage 1");

        let back = convert_to_domain_reading(stored).unwrap();
        assert_eq!(back.category, ReadingCategory::Stage1);
        assert_eq!(back.notes.as_deref(), Some("evening"));
        assert_eq!(back.updated_at, reading.updated_at);
    }

    #[test]
    fn test_corrupt_category_label_is_rejected() {
        let request = CreateReadingRequest {
            systolic: 120.0,
            diastolic: 80.0,
            pulse: 70.0,
            notes: None,
            timestamp: None,
        };
        let reading = Reading::create(Uuid::new_v4(), &request).unwrap();
        let mut stored = convert_to_data_reading(&reading);
        stored.category = "Severe".to_string();

        assert!(convert_to_domain_reading(stored).is_err());
    }
}
