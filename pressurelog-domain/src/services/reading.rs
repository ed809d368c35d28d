use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::entities::category::ReadingCategory;
use crate::entities::conversions;
use crate::entities::reading::{CreateReadingRequest, InvalidReading, Reading, UpdateReadingRequest};
use crate::services::analytics::{
    self, GoalReport, GoalTargets, Granularity, PatternReport, StatisticsReport, Summary, TrendPoint,
};
use pressurelog_data::models::reading::ReadingFilter;
use pressurelog_data::repository::{ReadingRepository, ReadingRepositoryTrait, RepositoryError};

/// Default analysis window for summaries, trends, and goal progress
pub const DEFAULT_SUMMARY_WINDOW_DAYS: u32 = 30;

/// Default analysis window for patterns and detailed statistics
pub const DEFAULT_PATTERN_WINDOW_DAYS: u32 = 90;

/// Default page size for reading listings
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Maximum number of candidates accepted by one bulk create call
pub const MAX_BULK_READINGS: usize = 100;

/// Reading service errors
#[derive(Debug, Error)]
pub enum ReadingServiceError {
    /// One or more physiological constraints violated; carries the ordered
    /// list of violation messages
    #[error("Invalid reading values: {}", .0.join(", "))]
    InvalidReading(Vec<String>),

    /// Payload-level validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Reading not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<InvalidReading> for ReadingServiceError {
    fn from(invalid: InvalidReading) -> Self {
        ReadingServiceError::InvalidReading(invalid.errors)
    }
}

/// Query options for listing a user's readings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingQuery {
    /// Only include readings from the last N days
    pub days: Option<u32>,

    /// Only include readings with this category
    pub category: Option<ReadingCategory>,

    /// Page size, defaults to [`DEFAULT_PAGE_LIMIT`]
    pub limit: Option<usize>,

    /// Number of readings to skip
    pub offset: Option<usize>,
}

/// One page of readings, newest first
#[derive(Debug, Clone, Serialize)]
pub struct ReadingPage {
    pub readings: Vec<Reading>,
    pub total_count: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Result of a bulk create: every successfully validated reading is persisted
/// even when others fail
#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateOutcome {
    pub created: Vec<Reading>,
    /// Per-candidate failure messages, prefixed with the 1-based position
    pub errors: Vec<String>,
}

/// Trait for blood pressure reading operations
#[async_trait]
pub trait ReadingServiceTrait {
    /// Validate the payload-level constraints of a create request
    fn validate_create_request(&self, request: &CreateReadingRequest) -> Result<(), ReadingServiceError>;

    /// Create a new reading for a user
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateReadingRequest,
    ) -> Result<Reading, ReadingServiceError>;

    /// Create up to [`MAX_BULK_READINGS`] readings in one call.
    /// Fails outright only when every candidate is invalid.
    async fn create_bulk(
        &self,
        user_id: Uuid,
        requests: Vec<CreateReadingRequest>,
    ) -> Result<BulkCreateOutcome, ReadingServiceError>;

    /// Get a reading by ID
    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<Reading, ReadingServiceError>;

    /// Get a filtered, paginated page of a user's readings
    async fn get_readings(&self, user_id: Uuid, query: ReadingQuery) -> Result<ReadingPage, ReadingServiceError>;

    /// Apply a partial update to a reading, re-validating and re-classifying
    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateReadingRequest,
    ) -> Result<Reading, ReadingServiceError>;

    /// Delete a reading by ID
    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ReadingServiceError>;

    /// Delete every reading belonging to a user (user-deletion cascade)
    async fn delete_all_readings(&self, user_id: Uuid) -> Result<usize, ReadingServiceError>;

    /// Aggregate summary over the last `days` (default 30)
    async fn summary(&self, user_id: Uuid, days: Option<u32>) -> Result<Summary, ReadingServiceError>;

    /// Bucketed trend series over the last `days` (default 30)
    async fn trends(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        granularity: Granularity,
    ) -> Result<Vec<TrendPoint>, ReadingServiceError>;

    /// Day-of-week and time-of-day patterns over the last `days` (default 90)
    async fn patterns(&self, user_id: Uuid, days: Option<u32>) -> Result<PatternReport, ReadingServiceError>;

    /// Goal progress over the last `days` (default 30)
    async fn goal_progress(
        &self,
        user_id: Uuid,
        targets: Option<GoalTargets>,
        days: Option<u32>,
    ) -> Result<GoalReport, ReadingServiceError>;

    /// Detailed statistics over the last `days` (default 90)
    async fn statistics(&self, user_id: Uuid, days: Option<u32>) -> Result<StatisticsReport, ReadingServiceError>;
}

/// Reading service for domain logic
pub struct ReadingService<R: ReadingRepositoryTrait> {
    repository: R,
}

impl<R: ReadingRepositoryTrait + Send + Sync> ReadingService<R> {
    /// Create a new reading service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ReadingServiceError {
        match err {
            RepositoryError::NotFound(msg) => ReadingServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ReadingServiceError::Validation(msg),
            _ => ReadingServiceError::Repository(err.to_string()),
        }
    }

    /// Fetch the domain readings taken within the last `days`, oldest first
    async fn readings_in_window(&self, user_id: Uuid, days: u32) -> Result<Vec<Reading>, ReadingServiceError> {
        let cutoff = Utc::now() - Duration::days(days as i64);
        let stored = self
            .repository
            .get_since(user_id, cutoff)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        stored
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ReadingServiceError::Repository)
    }
}

/// Flatten validator-crate errors into one readable message
fn payload_error_message(validation_errors: validator::ValidationErrors) -> String {
    validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| {
                    if let Some(msg) = &err.message {
                        msg.to_string()
                    } else {
                        format!("Invalid {}", field)
                    }
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}

#[async_trait]
impl<R: ReadingRepositoryTrait + Send + Sync> ReadingServiceTrait for ReadingService<R> {
    fn validate_create_request(&self, request: &CreateReadingRequest) -> Result<(), ReadingServiceError> {
        if let Err(validation_errors) = request.validate() {
            return Err(ReadingServiceError::Validation(payload_error_message(validation_errors)));
        }
        Ok(())
    }

    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateReadingRequest,
    ) -> Result<Reading, ReadingServiceError> {
        self.validate_create_request(&request)?;

        // Validated construction: classification and notes normalization happen here
        let reading = Reading::create(user_id, &request)?;

        self.repository
            .store(conversions::convert_to_data_reading(&reading))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        Ok(reading)
    }

    async fn create_bulk(
        &self,
        user_id: Uuid,
        requests: Vec<CreateReadingRequest>,
    ) -> Result<BulkCreateOutcome, ReadingServiceError> {
        if requests.is_empty() {
            return Err(ReadingServiceError::Validation(
                "At least one reading is required".to_string(),
            ));
        }
        if requests.len() > MAX_BULK_READINGS {
            return Err(ReadingServiceError::Validation(format!(
                "Maximum {} readings per bulk operation",
                MAX_BULK_READINGS
            )));
        }

        let mut created = Vec::new();
        let mut errors = Vec::new();

        // Each candidate is validated and classified independently
        for (index, request) in requests.iter().enumerate() {
            if let Err(validation_errors) = request.validate() {
                errors.push(format!(
                    "Reading {}: {}",
                    index + 1,
                    payload_error_message(validation_errors)
                ));
                continue;
            }

            match Reading::create(user_id, request) {
                Ok(reading) => created.push(reading),
                Err(invalid) => {
                    errors.extend(
                        invalid
                            .errors
                            .into_iter()
                            .map(|msg| format!("Reading {}: {}", index + 1, msg)),
                    );
                }
            }
        }

        // Nothing is persisted when every candidate failed
        if created.is_empty() {
            warn!("Bulk create rejected: all {} candidates failed validation", requests.len());
            return Err(ReadingServiceError::InvalidReading(errors));
        }

        let stored = created.iter().map(conversions::convert_to_data_reading).collect();
        self.repository
            .store_many(stored)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        Ok(BulkCreateOutcome { created, errors })
    }

    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<Reading, ReadingServiceError> {
        let stored = self
            .repository
            .get_by_id(user_id, id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| {
                ReadingServiceError::NotFound(format!("Blood pressure reading with ID {} not found", id))
            })?;

        conversions::convert_to_domain_reading(stored).map_err(ReadingServiceError::Repository)
    }

    async fn get_readings(&self, user_id: Uuid, query: ReadingQuery) -> Result<ReadingPage, ReadingServiceError> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let filter = ReadingFilter {
            since: query.days.map(|days| Utc::now() - Duration::days(days as i64)),
            category: query.category.map(|c| c.label().to_string()),
            limit: Some(limit),
            offset: Some(offset),
            sort_desc: Some(true),
        };

        let (stored, total_count) = self
            .repository
            .get_filtered(user_id, filter)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let readings = stored
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ReadingServiceError::Repository)?;

        Ok(ReadingPage {
            readings,
            total_count,
            limit,
            offset,
            has_more: total_count > offset + limit,
        })
    }

    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateReadingRequest,
    ) -> Result<Reading, ReadingServiceError> {
        if let Err(validation_errors) = request.validate() {
            return Err(ReadingServiceError::Validation(payload_error_message(validation_errors)));
        }

        let existing = self.get_reading(user_id, id).await?;

        // Re-validates the combined values and re-classifies atomically;
        // the stored record is untouched on failure
        let updated = existing.apply_update(&request)?;

        self.repository
            .update(conversions::convert_to_data_reading(&updated))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        Ok(updated)
    }

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ReadingServiceError> {
        self.repository
            .delete(user_id, id)
            .await
            .map_err(|e| self.map_repo_error(e))
    }

    async fn delete_all_readings(&self, user_id: Uuid) -> Result<usize, ReadingServiceError> {
        self.repository
            .delete_all_for_user(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))
    }

    async fn summary(&self, user_id: Uuid, days: Option<u32>) -> Result<Summary, ReadingServiceError> {
        let days = days.unwrap_or(DEFAULT_SUMMARY_WINDOW_DAYS);
        let readings = self.readings_in_window(user_id, days).await?;
        Ok(analytics::summary(&readings, days))
    }

    async fn trends(
        &self,
        user_id: Uuid,
        days: Option<u32>,
        granularity: Granularity,
    ) -> Result<Vec<TrendPoint>, ReadingServiceError> {
        let days = days.unwrap_or(DEFAULT_SUMMARY_WINDOW_DAYS);
        let readings = self.readings_in_window(user_id, days).await?;
        Ok(analytics::trend_series(&readings, granularity))
    }

    async fn patterns(&self, user_id: Uuid, days: Option<u32>) -> Result<PatternReport, ReadingServiceError> {
        let days = days.unwrap_or(DEFAULT_PATTERN_WINDOW_DAYS);
        let readings = self.readings_in_window(user_id, days).await?;
        Ok(analytics::patterns(&readings, days))
    }

    async fn goal_progress(
        &self,
        user_id: Uuid,
        targets: Option<GoalTargets>,
        days: Option<u32>,
    ) -> Result<GoalReport, ReadingServiceError> {
        let days = days.unwrap_or(DEFAULT_SUMMARY_WINDOW_DAYS);
        let readings = self.readings_in_window(user_id, days).await?;
        Ok(analytics::goal_progress(&readings, targets.unwrap_or_default(), days))
    }

    async fn statistics(&self, user_id: Uuid, days: Option<u32>) -> Result<StatisticsReport, ReadingServiceError> {
        let days = days.unwrap_or(DEFAULT_PATTERN_WINDOW_DAYS);
        let readings = self.readings_in_window(user_id, days).await?;
        Ok(analytics::statistics(&readings, days))
    }
}

/// Create a default reading service using the repository from the data layer
pub fn create_default_reading_service() -> impl ReadingServiceTrait + Send + Sync {
    ReadingService::new(ReadingRepository::new())
}
