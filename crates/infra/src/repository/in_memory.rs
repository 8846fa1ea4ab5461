use std::collections::HashMap;
use std::sync::RwLock;

use pledge_core::Entity;

use super::r#trait::{Repository, RepositoryError};

#[derive(Debug)]
struct Records<E: Entity> {
    order: Vec<E::Id>,
    by_id: HashMap<E::Id, E>,
}

impl<E: Entity> Records<E> {
    fn clash(&self, entity: &E, clashes: &dyn Fn(&E, &E) -> bool) -> Result<(), RepositoryError> {
        let id = entity.id();
        match self
            .by_id
            .values()
            .find(|existing| existing.id() != id && clashes(existing, entity))
        {
            Some(existing) => Err(RepositoryError::AlreadyExists(format!("{:?}", existing.id()))),
            None => Ok(()),
        }
    }
}

/// In-memory repository for tests/dev and the demo binary.
#[derive(Debug)]
pub struct InMemoryRepository<E: Entity> {
    inner: RwLock<Records<E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                order: Vec::new(),
                by_id: HashMap::new(),
            }),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Repository<E> for InMemoryRepository<E>
where
    E: Entity + Clone + Send + Sync,
    E::Id: Send + Sync,
{
    fn insert(&self, entity: E) -> Result<(), RepositoryError> {
        let mut records = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let id = entity.id();
        if records.by_id.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(format!("{id:?}")));
        }
        records.order.push(id);
        records.by_id.insert(id, entity);
        Ok(())
    }

    fn insert_unique(
        &self,
        entity: E,
        clashes: &dyn Fn(&E, &E) -> bool,
    ) -> Result<(), RepositoryError> {
        let mut records = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let id = entity.id();
        if records.by_id.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(format!("{id:?}")));
        }
        records.clash(&entity, clashes)?;
        records.order.push(id);
        records.by_id.insert(id, entity);
        Ok(())
    }

    fn get(&self, id: E::Id) -> Result<E, RepositoryError> {
        let records = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        records
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("{id:?}")))
    }

    fn update(&self, entity: E) -> Result<(), RepositoryError> {
        let mut records = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let id = entity.id();
        match records.by_id.get_mut(&id) {
            Some(slot) => {
                *slot = entity;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("{id:?}"))),
        }
    }

    fn update_unique(
        &self,
        entity: E,
        clashes: &dyn Fn(&E, &E) -> bool,
    ) -> Result<(), RepositoryError> {
        let mut records = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let id = entity.id();
        if !records.by_id.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!("{id:?}")));
        }
        records.clash(&entity, clashes)?;
        records.by_id.insert(id, entity);
        Ok(())
    }

    fn delete(&self, id: E::Id) -> Result<E, RepositoryError> {
        let mut records = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let removed = records
            .by_id
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("{id:?}")))?;
        records.order.retain(|k| *k != id);
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<E>, RepositoryError> {
        let records = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(records
            .order
            .iter()
            .filter_map(|id| records.by_id.get(id).cloned())
            .collect())
    }
}
