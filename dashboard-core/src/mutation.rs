//! Optimistic mutations against the record store.
//!
//! Updates and deletes are applied to the cache first, then sent to the store.
//! A rejected write puts the cache back exactly as it was and records an error
//! notice. Creates wait for the store, since only the store can assign an id.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{EntityCache, MutationKind, PendingMutation};
use crate::error::{DashboardError, Result, StoreError};
use crate::notify::Notifications;
use crate::store::{into_row, Record, RecordStore};

/// How concurrent edits to the same record are resolved.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Plain updates; whichever write lands last wins.
    #[default]
    LastWriteWins,
    /// Updates carry the `updated_at` the cache last saw and fail with a
    /// conflict if another writer got there first.
    RejectStale,
}

/// Notification titles for one mutation.
#[derive(Debug, Clone)]
pub struct Titles {
    pub success: String,
    pub failure: String,
}

impl Titles {
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }

    pub fn created<T: Record>() -> Self {
        Self::new(
            format!("{} created", capitalize(T::NOUN)),
            format!("Error creating {}", T::NOUN),
        )
    }

    pub fn updated<T: Record>() -> Self {
        Self::new(
            format!("{} updated", capitalize(T::NOUN)),
            format!("Error updating {}", T::NOUN),
        )
    }

    pub fn deleted<T: Record>() -> Self {
        Self::new(
            format!("{} deleted", capitalize(T::NOUN)),
            format!("Error deleting {}", T::NOUN),
        )
    }
}

fn capitalize(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct Protocol<'a> {
    store: &'a dyn RecordStore,
    notices: &'a mut Notifications,
    policy: ConcurrencyPolicy,
}

impl<'a> Protocol<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        notices: &'a mut Notifications,
        policy: ConcurrencyPolicy,
    ) -> Self {
        Self {
            store,
            notices,
            policy,
        }
    }

    /// Insert a record and add it to the cache once the store confirms it.
    pub async fn create<T: Record, I: Serialize>(
        &mut self,
        cache: &mut EntityCache<T>,
        input: &I,
        titles: Titles,
    ) -> Result<T> {
        let entity: T = self.insert(input, titles).await?;
        cache.add(entity.clone());
        Ok(entity)
    }

    /// Insert a record without caching it, for records outside the loaded view.
    pub async fn insert<T: Record, I: Serialize>(
        &mut self,
        input: &I,
        titles: Titles,
    ) -> Result<T> {
        let outcome = match into_row(input) {
            Ok(fields) => self
                .store
                .insert(T::TABLE, fields)
                .await
                .and_then(T::from_row),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(entity) => {
                self.notices.success(titles.success, None);
                Ok(entity)
            }
            Err(err) => {
                self.notices.error(titles.failure, err.to_string());
                Err(err.into())
            }
        }
    }

    pub async fn update<T: Record, P: Serialize>(
        &mut self,
        cache: &mut EntityCache<T>,
        id: Uuid,
        patch: &P,
    ) -> Result<T> {
        self.update_titled(cache, id, patch, Titles::updated::<T>())
            .await
    }

    /// Apply `patch` to the cached record, then write it through. On failure
    /// the cache is restored and the error is returned to the caller.
    pub async fn update_titled<T: Record, P: Serialize>(
        &mut self,
        cache: &mut EntityCache<T>,
        id: Uuid,
        patch: &P,
        titles: Titles,
    ) -> Result<T> {
        let fields = into_row(patch)?;
        let pending = cache.begin_update(id, fields, Utc::now())?;

        if let Err(err) = self.send(T::TABLE, &pending).await {
            return Err(self.fail(cache, pending, &titles, err));
        }

        if self.policy == ConcurrencyPolicy::RejectStale {
            // The store stamped its own updated_at; pick it up so the next
            // guarded write does not conflict with ourselves.
            self.refresh(cache, id).await;
        }
        self.notices.success(titles.success, None);

        cache.get(id).cloned().ok_or(DashboardError::NotLoaded {
            noun: T::NOUN,
            id,
        })
    }

    pub async fn delete<T: Record>(&mut self, cache: &mut EntityCache<T>, id: Uuid) -> Result<()> {
        self.delete_titled(cache, id, Titles::deleted::<T>()).await
    }

    pub async fn delete_titled<T: Record>(
        &mut self,
        cache: &mut EntityCache<T>,
        id: Uuid,
        titles: Titles,
    ) -> Result<()> {
        let pending = cache.begin_delete(id)?;

        if let Err(err) = self.send(T::TABLE, &pending).await {
            return Err(self.fail(cache, pending, &titles, err));
        }

        self.notices.success(titles.success, None);
        Ok(())
    }

    /// Issue the store call for a pending mutation.
    pub async fn send<T: Record>(
        &self,
        table: crate::store::Table,
        pending: &PendingMutation<T>,
    ) -> Result<(), StoreError> {
        let id = pending.id();
        match (pending.kind(), self.policy, pending.last_seen()) {
            (MutationKind::Delete, _, _) => self.store.delete(table, id).await,
            (MutationKind::Update, ConcurrencyPolicy::RejectStale, Some(last_seen)) => {
                self.store
                    .update_if_unchanged(table, id, pending.fields().clone(), last_seen)
                    .await
            }
            (MutationKind::Update, _, _) => {
                self.store
                    .update(table, id, pending.fields().clone())
                    .await
            }
        }
    }

    fn fail<T: Record>(
        &mut self,
        cache: &mut EntityCache<T>,
        pending: PendingMutation<T>,
        titles: &Titles,
        err: StoreError,
    ) -> DashboardError {
        cache.rollback(pending);
        self.notices.error(titles.failure.clone(), err.to_string());
        err.into()
    }

    /// Re-read a record after a guarded write. On failure the cache keeps its
    /// local `updated_at` and the next guarded write will conflict.
    async fn refresh<T: Record>(&mut self, cache: &mut EntityCache<T>, id: Uuid) {
        let message = match self.store.get(T::TABLE, id).await.and_then(|row| match row {
            Some(row) => T::from_row(row).map(Some),
            None => Ok(None),
        }) {
            Ok(Some(entity)) => {
                tracing::debug!(noun = T::NOUN, %id, "refreshed after guarded write");
                cache.put(entity);
                return;
            }
            Ok(None) => format!("The {} is no longer in the store", T::NOUN),
            Err(err) => err.to_string(),
        };
        self.notices.error(
            format!("Could not refresh {}", T::NOUN),
            format!("{message}. Reload before editing it again."),
        );
    }
}
