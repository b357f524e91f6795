//! Entity-type catalog seam
//!
//! The catalog is owned elsewhere; the engine only asks it whether an entity
//! type exists and what fields it has.

use crate::model::EntityType;
use std::collections::BTreeMap;

/// Read-only source of entity types
pub trait EntityTypeCatalog: Send + Sync {
    /// Look up an entity type by id
    fn entity_type(&self, id: &str) -> Option<EntityType>;

    fn contains(&self, id: &str) -> bool {
        self.entity_type(id).is_some()
    }
}

/// Catalog backed by a map, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    types: BTreeMap<String, EntityType>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entity type (builder style)
    pub fn with(mut self, entity_type: EntityType) -> Self {
        self.insert(entity_type);
        self
    }

    pub fn insert(&mut self, entity_type: EntityType) {
        self.types.insert(entity_type.id.clone(), entity_type);
    }
}

impl EntityTypeCatalog for InMemoryCatalog {
    fn entity_type(&self, id: &str) -> Option<EntityType> {
        self.types.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let catalog = InMemoryCatalog::new().with(EntityType::new("movie", "Movie"));
        assert!(catalog.contains("movie"));
        assert!(!catalog.contains("book"));
        assert_eq!(catalog.entity_type("movie").unwrap().label, "Movie");
    }
}
