use crate::entities::category::ReadingCategory;

/// Categorize a blood pressure reading based on AHA guidelines.
///
/// Conditions are evaluated in priority order and the first match wins, so a
/// single elevated field is enough to reach a higher category even when the
/// other field is normal. Input is assumed already validated; this function is
/// total and never fails.
pub fn categorize_reading(systolic: i32, diastolic: i32) -> ReadingCategory {
    if systolic >= 180 || diastolic >= 120 {
        ReadingCategory::Crisis
    } else if systolic >= 140 || diastolic >= 90 {
        ReadingCategory::Stage2
    } else if systolic >= 130 || diastolic >= 80 {
        ReadingCategory::Stage1
    } else if systolic >= 120 && diastolic < 80 {
        ReadingCategory::Elevated
    } else {
        ReadingCategory::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_normal() {
        let category = categorize_reading(110, 75);
        assert_eq!(category, ReadingCategory::Normal);

        // Just below every threshold
        let category = categorize_reading(119, 79);
        assert_eq!(category, ReadingCategory::Normal);
    }

    #[test]
    fn test_category_elevated() {
        let category = categorize_reading(125, 75);
        assert_eq!(category, ReadingCategory::Elevated);

        // Elevated requires diastolic below 80
        let category = categorize_reading(120, 79);
        assert_eq!(category, ReadingCategory::Elevated);
    }

    #[test]
    fn test_category_stage1() {
        // Test systolic in range
        let category = categorize_reading(135, 75);
        assert_eq!(category, ReadingCategory::Stage1);

        // Test diastolic in range
        let category = categorize_reading(110, 85);
        assert_eq!(category, ReadingCategory::Stage1);
    }

    #[test]
    fn test_category_stage2() {
        // Test systolic in range
        let category = categorize_reading(145, 75);
        assert_eq!(category, ReadingCategory::Stage2);

        // Test diastolic in range
        let category = categorize_reading(110, 95);
        assert_eq!(category, ReadingCategory::Stage2);
    }

    #[test]
    fn test_category_crisis() {
        // Test systolic in range
        let category = categorize_reading(185, 75);
        assert_eq!(category, ReadingCategory::Crisis);

        // Test diastolic in range
        let category = categorize_reading(110, 125);
        assert_eq!(category, ReadingCategory::Crisis);
    }

    #[test]
    fn test_crisis_dominates_regardless_of_other_field() {
        // Either field past the crisis threshold wins, whatever the other is
        for diastolic in [40, 79, 89, 119] {
            assert_eq!(categorize_reading(180, diastolic), ReadingCategory::Crisis);
        }
        for systolic in [121, 139, 179] {
            assert_eq!(categorize_reading(systolic, 120), ReadingCategory::Crisis);
        }
    }

    #[test]
    fn test_priority_order_is_monotonic() {
        // Satisfies both Stage 2 (diastolic) and Stage 1 (systolic) conditions;
        // the higher-priority category must win
        assert_eq!(categorize_reading(135, 95), ReadingCategory::Stage2);

        // Satisfies Stage 1 and the Elevated systolic bound
        assert_eq!(categorize_reading(125, 85), ReadingCategory::Stage1);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(categorize_reading(120, 79), ReadingCategory::Elevated);
        assert_eq!(categorize_reading(130, 79), ReadingCategory::Stage1);
        assert_eq!(categorize_reading(129, 80), ReadingCategory::Stage1);
        assert_eq!(categorize_reading(140, 79), ReadingCategory::Stage2);
        assert_eq!(categorize_reading(139, 90), ReadingCategory::Stage2);
        assert_eq!(categorize_reading(180, 79), ReadingCategory::Crisis);
        assert_eq!(categorize_reading(179, 120), ReadingCategory::Crisis);
    }
}
