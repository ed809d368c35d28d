use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use crate::models::reading::{ReadingFilter, StoredReading};

/// Repository trait for blood pressure readings
#[async_trait]
pub trait ReadingRepositoryTrait {
    /// Persist a new reading
    async fn store(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError>;

    /// Persist several readings in one call
    async fn store_many(&self, readings: Vec<StoredReading>) -> Result<Vec<StoredReading>, RepositoryError>;

    /// Get a reading by ID, scoped to its owner
    async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<StoredReading>, RepositoryError>;

    /// Replace an existing reading with an updated version
    async fn update(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError>;

    /// Delete a reading by ID, scoped to its owner
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError>;

    /// Delete every reading belonging to a user (user-deletion cascade)
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError>;

    /// Get filtered readings for a user plus the total match count
    async fn get_filtered(
        &self,
        user_id: Uuid,
        filter: ReadingFilter,
    ) -> Result<(Vec<StoredReading>, usize), RepositoryError>;

    /// Get a user's readings taken at or after the cutoff, oldest first
    async fn get_since(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> Result<Vec<StoredReading>, RepositoryError>;
}

/// Repository for blood pressure readings backed by in-memory storage.
///
/// Durable persistence lives behind this boundary in deployments; the
/// in-memory store is the reference implementation the services and tests
/// run against.
#[derive(Debug, Clone, Default)]
pub struct ReadingRepository {
    storage: InMemoryStorage,
}

impl ReadingRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl ReadingRepositoryTrait for ReadingRepository {
    async fn store(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError> {
        debug!("Storing blood pressure reading: {}", reading.id);
        self.storage.store_reading(&reading).await
    }

    async fn store_many(&self, readings: Vec<StoredReading>) -> Result<Vec<StoredReading>, RepositoryError> {
        debug!("Storing {} blood pressure readings", readings.len());
        let mut stored = Vec::with_capacity(readings.len());
        for reading in readings {
            stored.push(self.storage.store_reading(&reading).await?);
        }
        Ok(stored)
    }

    async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<StoredReading>, RepositoryError> {
        debug!("Getting blood pressure reading by ID: {}", id);
        self.storage.get_by_id(user_id, id).await
    }

    async fn update(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError> {
        debug!("Updating blood pressure reading: {}", reading.id);
        self.storage.replace_reading(&reading).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        debug!("Deleting blood pressure reading: {}", id);
        self.storage.remove_reading(user_id, id).await
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError> {
        debug!("Deleting all blood pressure readings for user: {}", user_id);
        self.storage.remove_all_for_user(user_id).await
    }

    async fn get_filtered(
        &self,
        user_id: Uuid,
        filter: ReadingFilter,
    ) -> Result<(Vec<StoredReading>, usize), RepositoryError> {
        debug!("Getting filtered blood pressure readings for user: {}", user_id);
        self.storage.get_filtered(user_id, &filter).await
    }

    async fn get_since(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> Result<Vec<StoredReading>, RepositoryError> {
        debug!(
            "Getting blood pressure readings for user {} since {}",
            user_id, cutoff
        );
        self.storage.get_since(user_id, cutoff).await
    }
}

/// Mock reading repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of ReadingRepositoryTrait for testing.
    /// Backed by a plain Vec so tests can seed it with predefined readings.
    #[derive(Debug, Default)]
    pub struct MockReadingRepository {
        readings: Mutex<Vec<StoredReading>>,
    }

    impl MockReadingRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self {
                readings: Mutex::new(Vec::new()),
            }
        }

        /// Create a mock repository with predefined readings
        pub fn with_readings(readings: Vec<StoredReading>) -> Self {
            Self {
                readings: Mutex::new(readings),
            }
        }
    }

    #[async_trait]
    impl ReadingRepositoryTrait for MockReadingRepository {
        async fn store(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError> {
            let mut store = self.readings.lock()?;
            store.push(reading.clone());
            Ok(reading)
        }

        async fn store_many(&self, readings: Vec<StoredReading>) -> Result<Vec<StoredReading>, RepositoryError> {
            let mut store = self.readings.lock()?;
            store.extend(readings.iter().cloned());
            Ok(readings)
        }

        async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<StoredReading>, RepositoryError> {
            let store = self.readings.lock()?;
            Ok(store
                .iter()
                .find(|r| r.id == id && r.user_id == user_id)
                .cloned())
        }

        async fn update(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError> {
            let mut store = self.readings.lock()?;
            match store
                .iter_mut()
                .find(|r| r.id == reading.id && r.user_id == reading.user_id)
            {
                Some(existing) => {
                    *existing = reading.clone();
                    Ok(reading)
                }
                None => Err(RepositoryError::NotFound(reading.id.to_string())),
            }
        }

        async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
            let mut store = self.readings.lock()?;
            let before = store.len();
            store.retain(|r| !(r.id == id && r.user_id == user_id));
            if store.len() == before {
                return Err(RepositoryError::NotFound(id.to_string()));
            }
            Ok(())
        }

        async fn delete_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError> {
            let mut store = self.readings.lock()?;
            let before = store.len();
            store.retain(|r| r.user_id != user_id);
            Ok(before - store.len())
        }

        async fn get_filtered(
            &self,
            user_id: Uuid,
            filter: ReadingFilter,
        ) -> Result<(Vec<StoredReading>, usize), RepositoryError> {
            let store = self.readings.lock()?;
            let sort_desc = filter.sort_desc.unwrap_or(true);

            let mut filtered: Vec<StoredReading> = store
                .iter()
                .filter(|reading| {
                    if reading.user_id != user_id {
                        return false;
                    }
                    if let Some(since) = filter.since {
                        if reading.timestamp < since {
                            return false;
                        }
                    }
                    if let Some(category) = &filter.category {
                        if reading.category != *category {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            filtered.sort_by(|a, b| {
                let cmp = a.timestamp.cmp(&b.timestamp);
                if sort_desc {
                    cmp.reverse()
                } else {
                    cmp
                }
            });

            let total = filtered.len();
            let offset = filter.offset.unwrap_or(0);
            let limit = filter.limit.unwrap_or(total);
            let page = filtered.into_iter().skip(offset).take(limit).collect();

            Ok((page, total))
        }

        async fn get_since(&self, user_id: Uuid, cutoff: DateTime<Utc>) -> Result<Vec<StoredReading>, RepositoryError> {
            let filter = ReadingFilter {
                since: Some(cutoff),
                sort_desc: Some(false),
                ..Default::default()
            };
            let (readings, _) = self.get_filtered(user_id, filter).await?;
            Ok(readings)
        }
    }

    #[cfg(test)]
    mod storage_tests {
        use super::*;
        use chrono::Duration;

        fn sample_reading(user_id: Uuid, systolic: i32, days_ago: i64) -> StoredReading {
            let now = Utc::now();
            StoredReading {
                id: Uuid::new_v4(),
                user_id,
                systolic,
                diastolic: 80,
                pulse: 70,
                category: "Normal".to_string(),
                notes: None,
                timestamp: now - Duration::days(days_ago),
                created_at: now,
                updated_at: now,
            }
        }

        #[tokio::test]
        async fn test_store_and_get_by_id() {
            let repo = ReadingRepository::new();
            let user_id = Uuid::new_v4();
            let reading = sample_reading(user_id, 120, 0);

            repo.store(reading.clone()).await.unwrap();

            let fetched = repo.get_by_id(user_id, reading.id).await.unwrap();
            assert_eq!(fetched.unwrap().systolic, 120);

            // Another user must not see the reading
            let other = repo.get_by_id(Uuid::new_v4(), reading.id).await.unwrap();
            assert!(other.is_none());
        }

        #[tokio::test]
        async fn test_get_since_is_sorted_ascending() {
            let repo = ReadingRepository::new();
            let user_id = Uuid::new_v4();

            repo.store(sample_reading(user_id, 130, 1)).await.unwrap();
            repo.store(sample_reading(user_id, 110, 5)).await.unwrap();
            repo.store(sample_reading(user_id, 120, 3)).await.unwrap();

            let cutoff = Utc::now() - Duration::days(30);
            let readings = repo.get_since(user_id, cutoff).await.unwrap();

            let systolics: Vec<i32> = readings.iter().map(|r| r.systolic).collect();
            assert_eq!(systolics, vec![110, 120, 130]);
        }

        #[tokio::test]
        async fn test_get_filtered_pagination_and_category() {
            let repo = ReadingRepository::new();
            let user_id = Uuid::new_v4();

            for day in 0..5 {
                repo.store(sample_reading(user_id, 120 + day, day as i64))
                    .await
                    .unwrap();
            }

            let filter = ReadingFilter {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            };
            let (page, total) = repo.get_filtered(user_id, filter).await.unwrap();
            assert_eq!(total, 5);
            assert_eq!(page.len(), 2);
            // Newest first by default; offset 1 skips the most recent
            assert_eq!(page[0].systolic, 121);

            let filter = ReadingFilter {
                category: Some("Crisis".to_string()),
                ..Default::default()
            };
            let (page, total) = repo.get_filtered(user_id, filter).await.unwrap();
            assert_eq!(total, 0);
            assert!(page.is_empty());
        }

        #[tokio::test]
        async fn test_delete_cascade() {
            let repo = ReadingRepository::new();
            let user_id = Uuid::new_v4();
            let other_user = Uuid::new_v4();

            repo.store(sample_reading(user_id, 120, 0)).await.unwrap();
            repo.store(sample_reading(user_id, 125, 1)).await.unwrap();
            repo.store(sample_reading(other_user, 130, 0)).await.unwrap();

            let removed = repo.delete_all_for_user(user_id).await.unwrap();
            assert_eq!(removed, 2);

            let cutoff = Utc::now() - Duration::days(30);
            assert!(repo.get_since(user_id, cutoff).await.unwrap().is_empty());
            assert_eq!(repo.get_since(other_user, cutoff).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_delete_missing_reading_is_not_found() {
            let repo = ReadingRepository::new();
            let result = repo.delete(Uuid::new_v4(), Uuid::new_v4()).await;
            assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        }
    }
}
