use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::RepositoryError;
use crate::models::reading::{ReadingFilter, StoredReading};

/// In-memory storage implementation for blood pressure readings
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    /// Storage for blood pressure readings, keyed by reading id
    readings: Arc<Mutex<HashMap<Uuid, StoredReading>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            readings: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a reading in memory
    pub async fn store_reading(&self, reading: &StoredReading) -> Result<StoredReading, RepositoryError> {
        let mut store = self.readings.lock()?;
        store.insert(reading.id, reading.clone());
        Ok(reading.clone())
    }

    /// Replace an existing reading; fails if it is not present or owned by another user
    pub async fn replace_reading(&self, reading: &StoredReading) -> Result<StoredReading, RepositoryError> {
        let mut store = self.readings.lock()?;
        match store.get(&reading.id) {
            Some(existing) if existing.user_id == reading.user_id => {
                store.insert(reading.id, reading.clone());
                Ok(reading.clone())
            }
            _ => Err(RepositoryError::NotFound(reading.id.to_string())),
        }
    }

    /// Get a reading by ID, scoped to its owner
    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> Result<Option<StoredReading>, RepositoryError> {
        let store = self.readings.lock()?;
        Ok(store
            .get(&id)
            .filter(|reading| reading.user_id == user_id)
            .cloned())
    }

    /// Remove a reading by ID, scoped to its owner
    pub async fn remove_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.readings.lock()?;
        match store.get(&id) {
            Some(existing) if existing.user_id == user_id => {
                store.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    /// Remove every reading belonging to a user, returning how many were removed
    pub async fn remove_all_for_user(&self, user_id: Uuid) -> Result<usize, RepositoryError> {
        let mut store = self.readings.lock()?;
        let before = store.len();
        store.retain(|_, reading| reading.user_id != user_id);
        Ok(before - store.len())
    }

    /// Get filtered readings for a user, with the total match count before pagination
    pub async fn get_filtered(
        &self,
        user_id: Uuid,
        filter: &ReadingFilter,
    ) -> Result<(Vec<StoredReading>, usize), RepositoryError> {
        let store = self.readings.lock()?;
        let sort_desc = filter.sort_desc.unwrap_or(true);

        let mut readings: Vec<StoredReading> = store
            .values()
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

        // Sort by timestamp
        readings.sort_by(|a, b| {
            let cmp = a.timestamp.cmp(&b.timestamp);
            if sort_desc {
                cmp.reverse()
            } else {
                cmp
            }
        });

        // Apply pagination
        let total = readings.len();
        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(total);

        let page = readings.into_iter().skip(offset).take(limit).collect();

        Ok((page, total))
    }

    /// Get a user's readings taken at or after the cutoff, oldest first
    pub async fn get_since(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<StoredReading>, RepositoryError> {
        let filter = ReadingFilter {
            since: Some(cutoff),
            sort_desc: Some(false),
            ..Default::default()
        };
        let (readings, _) = self.get_filtered(user_id, &filter).await?;
        Ok(readings)
    }
}
