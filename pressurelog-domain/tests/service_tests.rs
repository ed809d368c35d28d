//! End-to-end tests for the reading service: validated CRUD through the
//! repository boundary and the analytics operations over the stored window.

use chrono::{Duration, Utc};
use uuid::Uuid;

use pressurelog_data::repository::tests::MockReadingRepository;
use pressurelog_domain::entities::conversions::convert_to_data_reading;
use pressurelog_domain::entities::{CreateReadingRequest, ReadingCategory, UpdateReadingRequest};
use pressurelog_domain::services::analytics::{
    GoalReport, GoalTargets, GoalTrend, Granularity, PatternReport, StatisticsReport,
};
use pressurelog_domain::services::{ReadingService, ReadingServiceError, ReadingServiceTrait};
use pressurelog_domain::testing::{mock_reading_service, test_reading};

fn service() -> ReadingService<MockReadingRepository> {
    mock_reading_service()
}

fn request_at(days_ago: i64, systolic: f64, diastolic: f64, pulse: f64) -> CreateReadingRequest {
    CreateReadingRequest {
        systolic,
        diastolic,
        pulse,
        notes: None,
        timestamp: Some(Utc::now() - Duration::days(days_ago)),
    }
}

#[tokio::test]
async fn create_update_delete_round_trip() {
    let service = service();
    let user_id = Uuid::new_v4();

    let reading = service
        .create_reading(user_id, request_at(0, 132.0, 84.0, 70.0))
        .await
        .unwrap();
    assert_eq!(reading.category, ReadingCategory::Stage1);

    let updated = service
        .update_reading(
            user_id,
            reading.id,
            UpdateReadingRequest {
                systolic: Some(118.0),
                diastolic: Some(76.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.category, ReadingCategory::Normal);
    assert!(updated.updated_at >= reading.updated_at);
    assert_eq!(updated.created_at, reading.created_at);

    service.delete_reading(user_id, reading.id).await.unwrap();
    assert!(matches!(
        service.get_reading(user_id, reading.id).await,
        Err(ReadingServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn readings_are_scoped_to_their_owner() {
    let service = service();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let reading = service
        .create_reading(owner, request_at(0, 120.0, 80.0, 70.0))
        .await
        .unwrap();

    assert!(matches!(
        service.get_reading(stranger, reading.id).await,
        Err(ReadingServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_reading(stranger, reading.id).await,
        Err(ReadingServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn summary_reflects_only_the_requested_window() {
    let service = service();
    let user_id = Uuid::new_v4();

    // Two readings inside the 30-day window, one well outside it
    service
        .create_reading(user_id, request_at(2, 145.0, 95.0, 72.0))
        .await
        .unwrap();
    service
        .create_reading(user_id, request_at(5, 118.0, 76.0, 68.0))
        .await
        .unwrap();
    service
        .create_reading(user_id, request_at(120, 182.0, 122.0, 90.0))
        .await
        .unwrap();

    let summary = service.summary(user_id, None).await.unwrap();
    assert_eq!(summary.total_readings, 2);
    assert!(!summary.category_distribution.contains_key(&ReadingCategory::Crisis));

    let summary = service.summary(user_id, Some(365)).await.unwrap();
    assert_eq!(summary.total_readings, 3);
    assert_eq!(summary.category_distribution[&ReadingCategory::Crisis], 1);
}

#[tokio::test]
async fn trend_series_groups_by_requested_granularity() {
    let service = service();
    let user_id = Uuid::new_v4();

    for days_ago in [1, 1, 2, 9] {
        service
            .create_reading(user_id, request_at(days_ago, 120.0, 80.0, 70.0))
            .await
            .unwrap();
    }

    let daily = service.trends(user_id, None, Granularity::Day).await.unwrap();
    assert_eq!(daily.len(), 3);
    assert_eq!(daily.iter().map(|p| p.count).sum::<usize>(), 4);
    // Keys ascend
    assert!(daily.windows(2).all(|w| w[0].period < w[1].period));

    let monthly = service.trends(user_id, None, Granularity::Month).await.unwrap();
    assert!(monthly.len() <= 2);
}

#[tokio::test]
async fn pattern_analysis_over_the_service_window() {
    let service = service();
    let user_id = Uuid::new_v4();

    for days_ago in 0..8 {
        service
            .create_reading(user_id, request_at(days_ago, 124.0, 79.0, 70.0))
            .await
            .unwrap();
    }

    match service.patterns(user_id, None).await.unwrap() {
        PatternReport::Patterns {
            day_of_week,
            time_of_day,
            insights,
            total_readings_analyzed,
            ..
        } => {
            assert_eq!(total_readings_analyzed, 8);
            assert_eq!(day_of_week.values().map(|b| b.count).sum::<usize>(), 8);
            assert_eq!(time_of_day.values().map(|b| b.count).sum::<usize>(), 8);
            assert_eq!(insights.len(), 2);
        }
        PatternReport::InsufficientData { .. } => panic!("expected pattern buckets"),
    }
}

#[tokio::test]
async fn goal_progress_with_custom_targets() {
    let service = service();
    let user_id = Uuid::new_v4();

    service
        .create_reading(user_id, request_at(1, 128.0, 82.0, 70.0))
        .await
        .unwrap();
    service
        .create_reading(user_id, request_at(2, 132.0, 86.0, 72.0))
        .await
        .unwrap();

    let targets = GoalTargets {
        systolic: 130,
        diastolic: 85,
    };
    match service.goal_progress(user_id, Some(targets), None).await.unwrap() {
        GoalReport::Progress(progress) => {
            assert_eq!(progress.targets, targets);
            assert_eq!(progress.readings_within_target, 1);
            assert_eq!(progress.within_target_percentage, 50.0);
            assert_eq!(progress.current_averages.systolic, 130.0);
        }
        GoalReport::NoData { .. } => panic!("expected progress"),
    }
}

#[tokio::test]
async fn goal_trend_over_seeded_reading_history() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    // Two weeks of history: an early high week, a recent lower week, plus one
    // stale reading that the 30-day window must exclude
    let mut seeded = Vec::new();
    for days_ago in 14..=20 {
        seeded.push(test_reading(user_id, 150, 85, 72, now - Duration::days(days_ago)));
    }
    for days_ago in 0..=6 {
        seeded.push(test_reading(user_id, 130, 75, 70, now - Duration::days(days_ago)));
    }
    seeded.push(test_reading(user_id, 182, 122, 90, now - Duration::days(60)));

    let stored = seeded.iter().map(convert_to_data_reading).collect();
    let service = ReadingService::new(MockReadingRepository::with_readings(stored));

    match service.goal_progress(user_id, None, Some(30)).await.unwrap() {
        GoalReport::Progress(progress) => {
            assert_eq!(progress.total_readings, 14);
            assert_eq!(progress.current_averages.systolic, 140.0);
            assert_eq!(progress.current_averages.diastolic, 80.0);
            assert_eq!(progress.progress_trend, GoalTrend::Improving);
        }
        GoalReport::NoData { .. } => panic!("expected progress"),
    }
}

#[tokio::test]
async fn statistics_median_uses_the_shared_percentile() {
    let service = service();
    let user_id = Uuid::new_v4();

    for (days_ago, systolic) in [(1, 100.0), (2, 110.0), (3, 120.0), (4, 130.0)] {
        service
            .create_reading(user_id, request_at(days_ago, systolic, 70.0, 65.0))
            .await
            .unwrap();
    }

    match service.statistics(user_id, None).await.unwrap() {
        StatisticsReport::Statistics(stats) => {
            assert_eq!(stats.systolic.median, 115.0);
            assert_eq!(stats.total_readings, 4);
            // Diastolic is constant, so the correlation degenerates to zero
            assert_eq!(stats.correlations.systolic_diastolic, 0.0);
        }
        StatisticsReport::NoData { .. } => panic!("expected statistics"),
    }
}

#[tokio::test]
async fn bulk_create_persists_the_valid_subset() {
    let service = service();
    let user_id = Uuid::new_v4();

    let outcome = service
        .create_bulk(
            user_id,
            vec![
                request_at(1, 119.0, 75.0, 64.0),
                request_at(2, 500.0, 80.0, 70.0),
                request_at(3, 141.0, 92.0, 78.0),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert_eq!(outcome.errors.len(), 1);

    let summary = service.summary(user_id, None).await.unwrap();
    assert_eq!(summary.total_readings, 2);
    assert_eq!(summary.category_distribution[&ReadingCategory::Normal], 1);
    assert_eq!(summary.category_distribution[&ReadingCategory::Stage2], 1);
}
