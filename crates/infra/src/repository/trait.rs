use std::sync::Arc;

use thiserror::Error;

use pledge_core::Entity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record already exists: {0}")]
    AlreadyExists(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Keyed storage for entities.
///
/// `list` returns records in insertion order.
pub trait Repository<E: Entity>: Send + Sync {
    fn insert(&self, entity: E) -> Result<(), RepositoryError>;

    /// Insert unless `clashes(existing, &entity)` holds for a stored record.
    ///
    /// The check and the write happen under one lock, so concurrent callers
    /// cannot both pass the check.
    fn insert_unique(
        &self,
        entity: E,
        clashes: &dyn Fn(&E, &E) -> bool,
    ) -> Result<(), RepositoryError>;

    fn get(&self, id: E::Id) -> Result<E, RepositoryError>;

    /// Replace an existing record.
    fn update(&self, entity: E) -> Result<(), RepositoryError>;

    /// Replace an existing record unless another record clashes with it.
    fn update_unique(
        &self,
        entity: E,
        clashes: &dyn Fn(&E, &E) -> bool,
    ) -> Result<(), RepositoryError>;

    fn delete(&self, id: E::Id) -> Result<E, RepositoryError>;

    fn list(&self) -> Result<Vec<E>, RepositoryError>;
}

impl<E, R> Repository<E> for Arc<R>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    fn insert(&self, entity: E) -> Result<(), RepositoryError> {
        (**self).insert(entity)
    }

    fn insert_unique(
        &self,
        entity: E,
        clashes: &dyn Fn(&E, &E) -> bool,
    ) -> Result<(), RepositoryError> {
        (**self).insert_unique(entity, clashes)
    }

    fn get(&self, id: E::Id) -> Result<E, RepositoryError> {
        (**self).get(id)
    }

    fn update(&self, entity: E) -> Result<(), RepositoryError> {
        (**self).update(entity)
    }

    fn update_unique(
        &self,
        entity: E,
        clashes: &dyn Fn(&E, &E) -> bool,
    ) -> Result<(), RepositoryError> {
        (**self).update_unique(entity, clashes)
    }

    fn delete(&self, id: E::Id) -> Result<E, RepositoryError> {
        (**self).delete(id)
    }

    fn list(&self) -> Result<Vec<E>, RepositoryError> {
        (**self).list()
    }
}
