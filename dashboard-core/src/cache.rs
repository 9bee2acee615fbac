//! Client-side cache of records mirrored from the store.
//!
//! An [`EntityCache`] holds what one view shows: the visible list plus the
//! record open in a detail view, if any. Both are captured together in a
//! [`Snapshot`], so a rollback restores them in lockstep.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DashboardError, StoreError};
use crate::store::{Record, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    items: Vec<T>,
    selected: Option<T>,
}

impl<T> Snapshot<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Update,
    Delete,
}

/// A mutation applied locally but not yet confirmed by the store.
#[derive(Debug, Clone)]
pub struct PendingMutation<T> {
    id: Uuid,
    kind: MutationKind,
    fields: Row,
    last_seen: Option<DateTime<Utc>>,
    previous: Snapshot<T>,
}

impl<T> PendingMutation<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Fields to send to the store (empty for deletes).
    pub fn fields(&self) -> &Row {
        &self.fields
    }

    /// `updated_at` of the record before the local apply.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    pub fn previous(&self) -> &Snapshot<T> {
        &self.previous
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Inserted,
    Updated,
}

#[derive(Debug, Clone)]
pub struct EntityCache<T: Record> {
    items: Vec<T>,
    selected: Option<T>,
}

impl<T: Record> Default for EntityCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
        }
    }
}

impl<T: Record> EntityCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items,
            selected: None,
        }
    }

    /// Replace the list after a full fetch. An open detail view is refreshed
    /// from the new list when its record is still present.
    pub fn load(&mut self, items: Vec<T>) {
        if let Some(selected) = &self.selected {
            if let Some(fresh) = items.iter().find(|i| i.id() == selected.id()) {
                self.selected = Some(fresh.clone());
            }
        }
        self.items = items;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look a record up in the list, falling back to the detail view.
    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items
            .iter()
            .find(|i| i.id() == id)
            .or_else(|| self.selected.as_ref().filter(|s| s.id() == id))
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, entity: T) {
        self.selected = Some(entity);
    }

    pub fn close(&mut self) -> Option<T> {
        self.selected.take()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items.clone(),
            selected: self.selected.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot<T>) {
        self.items = snapshot.items;
        self.selected = snapshot.selected;
    }

    /// Replace a record wherever it is shown. Returns whether the list held it.
    pub fn put(&mut self, entity: T) -> bool {
        let id = entity.id();
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = Some(entity.clone());
        }
        match self.items.iter_mut().find(|i| i.id() == id) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    /// Add a freshly created record at the end its kind is listed from.
    pub fn add(&mut self, entity: T) {
        if T::NEWEST_FIRST {
            self.items.insert(0, entity);
        } else {
            self.items.push(entity);
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = None;
        }
        let index = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Take the store's version of a row as authoritative.
    pub fn reconcile(&mut self, row: Row) -> Result<Reconciled, StoreError> {
        let entity = T::from_row(row)?;
        if self.put(entity.clone()) {
            Ok(Reconciled::Updated)
        } else {
            self.add(entity);
            Ok(Reconciled::Inserted)
        }
    }

    /// Apply an update locally and remember how to undo it.
    pub fn begin_update(
        &mut self,
        id: Uuid,
        fields: Row,
        now: DateTime<Utc>,
    ) -> Result<PendingMutation<T>, DashboardError> {
        let current = self.get(id).ok_or(DashboardError::NotLoaded {
            noun: T::NOUN,
            id,
        })?;
        let last_seen = current.updated_at();
        let updated = merge_patch(current, &fields, now)?;

        let previous = self.snapshot();
        self.put(updated);

        Ok(PendingMutation {
            id,
            kind: MutationKind::Update,
            fields,
            last_seen,
            previous,
        })
    }

    /// Remove a record locally and remember how to undo it.
    pub fn begin_delete(&mut self, id: Uuid) -> Result<PendingMutation<T>, DashboardError> {
        let last_seen = self
            .get(id)
            .ok_or(DashboardError::NotLoaded {
                noun: T::NOUN,
                id,
            })?
            .updated_at();

        let previous = self.snapshot();
        self.remove(id);

        Ok(PendingMutation {
            id,
            kind: MutationKind::Delete,
            fields: Row::new(),
            last_seen,
            previous,
        })
    }

    /// Undo a pending mutation by restoring the state it replaced.
    pub fn rollback(&mut self, pending: PendingMutation<T>) {
        tracing::debug!(noun = T::NOUN, id = %pending.id, "rolling back local change");
        self.restore(pending.previous);
    }
}

/// Overlay patch fields on a record and stamp its update time.
pub fn merge_patch<T: Record>(
    entity: &T,
    patch: &Row,
    now: DateTime<Utc>,
) -> Result<T, StoreError> {
    let mut row = entity.to_row()?;
    for (column, value) in patch {
        row.insert(column.clone(), value.clone());
    }
    if entity.updated_at().is_some() {
        row.insert("updated_at".into(), serde_json::to_value(now)?);
    }
    T::from_row(row)
}
