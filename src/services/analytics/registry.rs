// Entity Registry
// Assigns each distinct participant a stable, first-seen index

use std::collections::HashMap;

use crate::models::{ComparisonRecord, Entity};

/// Owned name -> index table for one report.
///
/// Identity is exact, case-sensitive name equality. Indices are dense and
/// never reused; the registry only grows until the report is replaced.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    by_name: HashMap<String, usize>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration pass over a comparison list, A then B per record.
    pub fn from_comparisons(comparisons: &[ComparisonRecord]) -> Self {
        let mut registry = Self::new();
        for record in comparisons {
            registry.register(&record.participant_a);
            registry.register(&record.participant_b);
        }
        registry
    }

    /// Index for `name`, appending a new entity on first sight.
    pub fn register(&mut self, name: &str) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        let index = self.entities.len();
        self.entities.push(Entity {
            name: name.to_string(),
            index,
        });
        self.by_name.insert(name.to_string(), index);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.entities.get(index).map(|e| e.name.as_str())
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn names(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
